//! Slot repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Slot, SlotStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Save a new slot
    async fn save(&self, slot: Slot) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Slot>>;

    /// All slots ordered by name
    async fn find_all(&self) -> DomainResult<Vec<Slot>>;

    /// Replace an existing slot's attributes, keeping its stored `status`;
    /// `SlotNotFound` if it does not exist
    async fn update(&self, slot: Slot) -> DomainResult<()>;

    /// Returns `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;

    /// Set status unconditionally and return the updated slot
    async fn set_status(&self, id: Uuid, status: SlotStatus) -> DomainResult<Option<Slot>>;
}
