//! 모터-펌프 벨트 전동 설계 모듈.

pub mod belt_drive;

pub use belt_drive::*;
