pub mod artifact;
pub mod backend;
pub mod convert;
pub mod error;
pub mod reference;
pub mod spec;
pub mod tensor;
pub mod version;

pub use artifact::*;
pub use backend::*;
pub use error::*;
pub use reference::*;
pub use spec::*;
pub use tensor::*;
pub use version::*;
