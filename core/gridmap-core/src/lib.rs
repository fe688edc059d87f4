//! # gridmap — Datastore Dialects for Object/Grid Mapping
//!
//! gridmap은 하나의 영속성 엔진이 서로 다른 물리 저장소(문서, 컬럼 패밀리,
//! 키-값, 그래프)를 동일한 연산 집합으로 다룰 수 있게 하는 다이얼렉트 계층입니다.
//!
//! ## 주요 특징
//!
//! - **GridDialect 트레이트**: 백엔드 어댑터가 구현하는 단일 능력 계약
//! - **보수적 기본값**: 잠금, 타입 오버라이드, 시퀀스, 중복 삽입 방지
//! - **Tuple/Key 모델**: 백엔드 독립적인 행과 식별자 표현
//! - **번들 데이터스토어**: In-memory, sled
//!
//! ## 빠른 시작
//!
//! ```rust
//! use gridmap_core::datastore::InMemoryDialect;
//! use gridmap_core::dialect::GridDialect;
//! use gridmap_core::model::{EntityKey, EntityKeyMetadata, Tuple, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> gridmap_core::GridResult<()> {
//! let dialect = InMemoryDialect::new();
//! let users = Arc::new(EntityKeyMetadata::new("users", ["id"]));
//!
//! // 튜플 생성 및 저장
//! let key = EntityKey::new(users.clone(), [Value::Int(1)])?;
//! let mut tuple = dialect.create_tuple(&key)?;
//! tuple.put("name", "alice");
//! dialect.insert_or_update_tuple(&key, &tuple)?;
//!
//! // 타입 전체 순회
//! let mut names = Vec::new();
//! dialect.for_each_tuple(
//!     &mut |t: &Tuple| names.push(t.get("name").cloned()),
//!     &[users.as_ref()],
//! )?;
//! assert_eq!(names, vec![Some(Value::from("alice"))]);
//! # Ok(())
//! # }
//! ```
//!
//! ## 모듈 구조
//!
//! - [`model`] — Tuple, EntityKey, AssociationKey 등 데이터 모델
//! - [`dialect`] — [`GridDialect`](dialect::GridDialect) 계약과 기본 전략
//! - [`datastore`] — In-memory / sled 다이얼렉트와 팩토리
//! - [`persister`] — 중복 삽입 방지 전략을 적용하는 쓰기 경로
//! - [`api`] — `#[derive(Entity)]` 매핑 트레이트
//! - [`config`] — 명시적 설정 객체

// lets `#[derive(Entity)]` output refer to `::gridmap_core` inside this crate
extern crate self as gridmap_core;

pub mod api;
pub mod config;
pub mod datastore;
pub mod dialect;
pub mod error;
pub mod model;
pub mod persister;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use api::Entity;
pub use config::DialectConfig;
pub use dialect::GridDialect;
pub use error::{GridError, GridResult};

// Re-export derive macros
pub use gridmap_derive::Entity;
