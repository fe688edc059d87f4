//! API 모듈 — 엔티티 매핑 API
//!
//! Entity, IntoValue, FromValue 트레이트 제공. `#[derive(Entity)]`가 구현을 생성합니다.

pub mod traits;

pub use traits::{Entity, FromValue, IntoValue};
