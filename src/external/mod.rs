pub mod console;
pub mod email;
pub mod smtp;
/// 测试替身，只在测试或 test-util feature 下编译
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use console::*;
pub use email::*;
pub use smtp::*;
#[cfg(any(test, feature = "test-util"))]
pub use testing::*;
