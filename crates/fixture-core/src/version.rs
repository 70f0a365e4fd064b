//! ONNX release table: the lowest IR version able to carry each default-domain
//! opset.

use crate::FormatError;

pub const MIN_IR_VERSION: i64 = 3;
pub const MAX_IR_VERSION: i64 = 11;
pub const MAX_OPSET: i64 = 23;

/// (last opset in range, minimum IR version)
const OPSET_IR_TABLE: &[(i64, i64)] = &[
    (8, 3),
    (9, 4),
    (10, 5),
    (11, 6),
    (14, 7),
    (18, 8),
    (20, 9),
    (22, 10),
    (23, 11),
];

pub fn required_ir_version(opset: i64) -> Result<i64, FormatError> {
    if opset < 1 {
        return Err(FormatError::UnknownOpset(opset));
    }
    OPSET_IR_TABLE
        .iter()
        .find(|(last, _)| opset <= *last)
        .map(|(_, ir)| *ir)
        .ok_or(FormatError::UnknownOpset(opset))
}

pub fn check_compatible(ir_version: i64, opset: i64) -> Result<(), FormatError> {
    if !(MIN_IR_VERSION..=MAX_IR_VERSION).contains(&ir_version) {
        return Err(FormatError::UnsupportedIrVersion(ir_version));
    }
    let required = required_ir_version(opset)?;
    if ir_version < required {
        return Err(FormatError::IncompatibleVersions {
            ir_version,
            opset,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_pair_is_accepted() {
        assert_eq!(required_ir_version(13), Ok(7));
        assert_eq!(check_compatible(8, 13), Ok(()));
    }

    #[test]
    fn range_edges() {
        assert_eq!(required_ir_version(1), Ok(3));
        assert_eq!(required_ir_version(14), Ok(7));
        assert_eq!(required_ir_version(15), Ok(8));
        assert_eq!(required_ir_version(MAX_OPSET), Ok(11));
        assert_eq!(required_ir_version(24), Err(FormatError::UnknownOpset(24)));
        assert_eq!(required_ir_version(0), Err(FormatError::UnknownOpset(0)));
    }

    #[test]
    fn newer_opset_than_ir_allows_is_rejected() {
        assert_eq!(
            check_compatible(8, 19),
            Err(FormatError::IncompatibleVersions {
                ir_version: 8,
                opset: 19,
                required: 9,
            })
        );
    }

    #[test]
    fn ir_version_out_of_range() {
        assert_eq!(check_compatible(2, 1), Err(FormatError::UnsupportedIrVersion(2)));
        assert_eq!(check_compatible(12, 13), Err(FormatError::UnsupportedIrVersion(12)));
    }
}
