mod interface;
#[cfg(feature = "sources")]
mod os;
#[cfg(feature = "sources")]
mod seeded;
#[cfg(feature = "sources")]
mod thread;

pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sources")))]
#[cfg(feature = "sources")]
pub use os::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sources")))]
#[cfg(feature = "sources")]
pub use seeded::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sources")))]
#[cfg(feature = "sources")]
pub use thread::*;
