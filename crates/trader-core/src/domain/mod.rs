//! 분석 및 리스크 검증을 위한 도메인 모델.

mod calculations;
mod market_data;
mod order;
mod position;

pub use calculations::*;
pub use market_data::*;
pub use order::*;
pub use position::*;
