//! Call history domain module

mod call_record;
mod filter;

pub use call_record::{CallPage, CallRecord};
pub use filter::{parse_queue_list, AudioExtension, CallFilter};
