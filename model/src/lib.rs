pub mod base;
pub mod kind;
pub mod storage;
mod util;
pub mod value;

pub use base::BaseModel;
pub use kind::ModelKind;
pub use storage::Storage;
pub use value::Value;
