pub mod analysis;
pub mod prompts;
pub mod sanitize;
pub mod transform;

pub use analysis::SvgComplexity;
pub use sanitize::strip_code_fences;
pub use transform::{TransformRequest, TransformResponse};
