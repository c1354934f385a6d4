//! Workbook state store
//!
//! `WorkbookStore` owns the current workspace state, the block id counter and
//! a storage backend. Every applied message is persisted as a full snapshot
//! and then broadcast to subscribers in subscription order.

use crate::config::STORAGE_KEY;
use crate::message::WorkspaceMessage;
use crate::state::{
    restore_from_json, update, AppWorkspaceState, BlockFieldPatch, BlockId, BlockIdAllocator,
    BlockType, DocumentSettingsPatch, MoveDirection, OverlayVisibilityPatch, ThemeMode,
    Transition, UiLanguageCode, WorkbookBlock, WorkspaceTab,
};
use crate::error::{BlockFieldResult, StorageError};
use crate::storage::{KeyValueStorage, MemoryStorage};
use serde_json::{Map, Value};

/// Receives every published state
pub trait WorkspaceSubscriber {
    fn on_state_changed(&mut self, state: &AppWorkspaceState);
}

impl<F> WorkspaceSubscriber for F
where
    F: FnMut(&AppWorkspaceState),
{
    fn on_state_changed(&mut self, state: &AppWorkspaceState) {
        self(state)
    }
}

/// Handle returned by [`WorkbookStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The single source of truth for the editor workspace
pub struct WorkbookStore<S: KeyValueStorage = MemoryStorage> {
    state: AppWorkspaceState,
    block_ids: BlockIdAllocator,
    storage: S,
    storage_key: String,
    subscribers: Vec<(SubscriptionId, Box<dyn WorkspaceSubscriber>)>,
    next_subscription: u64,
    persist_error: Option<StorageError>,
}

impl<S: KeyValueStorage> WorkbookStore<S> {
    /// Open a store over `storage` using the default key
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    /// Open a store, restoring whatever snapshot is kept under `storage_key`
    ///
    /// Missing or malformed snapshots give the default workspace. Nothing is
    /// written until the first mutation.
    pub fn open_with_key(storage: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let mut block_ids = BlockIdAllocator::new();
        let fallback = AppWorkspaceState::initial(&mut block_ids);

        let state = match storage.read(&storage_key) {
            Ok(Some(payload)) => match restore_from_json(&fallback, &payload) {
                Ok(state) => state,
                Err(e) => {
                    log::debug!("Discarding stored workspace state: {}", e);
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(e) => {
                log::warn!("Failed to read stored workspace state: {}", e);
                fallback
            }
        };

        block_ids.synchronize(&state.workbook_blocks);
        log::debug!(
            "Opened workbook store with {} blocks, next id {:?}",
            state.workbook_blocks.len(),
            block_ids.peek()
        );

        Self {
            state,
            block_ids,
            storage,
            storage_key,
            subscribers: Vec::new(),
            next_subscription: 1,
            persist_error: None,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> &AppWorkspaceState {
        &self.state
    }

    /// Selected block, `None` when nothing or a missing id is selected
    pub fn selected_block(&self) -> Option<&WorkbookBlock> {
        self.state.selected_block()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Why the most recent publish could not be persisted, if it failed
    pub fn persist_error(&self) -> Option<&StorageError> {
        self.persist_error.as_ref()
    }

    /// Register a subscriber for every future state
    pub fn subscribe(&mut self, subscriber: impl WorkspaceSubscriber + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber; returns false when it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Apply a message, then persist and broadcast the new state
    ///
    /// Returns whether a state was published. Rejected block patches leave the
    /// store untouched.
    pub fn dispatch(&mut self, message: WorkspaceMessage) -> BlockFieldResult<bool> {
        let name = message.name();
        match update(&self.state, &mut self.block_ids, message)? {
            Transition::Applied(next) => {
                log::debug!("Applied {}", name);
                self.state = next;
                self.publish();
                Ok(true)
            }
            Transition::Skipped => {
                log::debug!("Skipped {}: nothing to change", name);
                Ok(false)
            }
        }
    }

    /// Dispatch a message that cannot be rejected
    fn apply(&mut self, message: WorkspaceMessage) {
        if let Err(e) = self.dispatch(message) {
            log::error!("Unexpected rejection: {}", e);
        }
    }

    pub fn set_active_ui_language_code(&mut self, code: UiLanguageCode) {
        self.apply(WorkspaceMessage::SetLanguage(code));
    }

    pub fn set_active_theme_mode(&mut self, mode: ThemeMode) {
        self.apply(WorkspaceMessage::SetTheme(mode));
    }

    pub fn set_active_workspace_tab(&mut self, tab: WorkspaceTab) {
        self.apply(WorkspaceMessage::SetTab(tab));
    }

    /// Append a block of `block_type` with default fields and select it
    ///
    /// Returns the new id, or `None` once the id counter is exhausted.
    pub fn add_workbook_block(&mut self, block_type: BlockType) -> Option<BlockId> {
        match self.dispatch(WorkspaceMessage::AddBlock(block_type)) {
            // the added block is always selected
            Ok(true) => self.state.selected_workbook_block_id.clone(),
            Ok(false) => None,
            Err(e) => {
                log::error!("Unexpected rejection: {}", e);
                None
            }
        }
    }

    /// Point the selection at `block_id` without checking that it exists
    pub fn select_workbook_block(&mut self, block_id: BlockId) {
        self.apply(WorkspaceMessage::SelectBlock(block_id));
    }

    pub fn reorder_workbook_block_by_direction(&mut self, block_id: BlockId, direction: MoveDirection) {
        self.apply(WorkspaceMessage::MoveBlock { block_id, direction });
    }

    pub fn reorder_workbook_blocks_by_drag(&mut self, source: BlockId, target: BlockId) {
        self.apply(WorkspaceMessage::DragBlock { source, target });
    }

    pub fn update_document_settings(&mut self, patch: DocumentSettingsPatch) {
        self.apply(WorkspaceMessage::UpdateDocumentSettings(patch));
    }

    pub fn update_preview_overlay_visibility(&mut self, patch: OverlayVisibilityPatch) {
        self.apply(WorkspaceMessage::UpdateOverlays(patch));
    }

    /// Merge `patch` into the selected block
    ///
    /// Returns `Ok(false)` without a live selection.
    pub fn update_selected_block_fields(&mut self, patch: BlockFieldPatch) -> BlockFieldResult<bool> {
        self.dispatch(WorkspaceMessage::UpdateSelectedBlock(patch))
    }

    /// Merge a loose field map into the selected block, parsed against its kind
    pub fn update_selected_block_field_map(&mut self, fields: &Map<String, Value>) -> BlockFieldResult<bool> {
        let Some(block_type) = self.selected_block().map(WorkbookBlock::block_type) else {
            return Ok(false);
        };
        let patch = BlockFieldPatch::from_field_map(block_type, fields)?;
        self.update_selected_block_fields(patch)
    }

    /// Set one field of the selected block from raw text input
    pub fn update_selected_block_field(&mut self, field: &str, raw: &str) -> BlockFieldResult<bool> {
        let Some(block_type) = self.selected_block().map(WorkbookBlock::block_type) else {
            return Ok(false);
        };
        let patch = BlockFieldPatch::from_field_text(block_type, field, raw)?;
        self.update_selected_block_fields(patch)
    }

    /// Replace the workspace with the default one and publish it
    ///
    /// The default blocks keep their `block_1`.. ids; the counter only moves
    /// forward past them.
    pub fn reset(&mut self) {
        self.state = AppWorkspaceState::initial(&mut BlockIdAllocator::new());
        self.block_ids.advance_past(&self.state.workbook_blocks);
        log::info!("Workspace reset to defaults");
        self.publish();
    }

    fn publish(&mut self) {
        self.persist_error = self.persist().err();
        if let Some(e) = &self.persist_error {
            log::warn!("Failed to persist workspace state: {}", e);
        }

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber.on_state_changed(&self.state);
        }
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.state)?;
        self.storage.write(&self.storage_key, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{OverlayKind, TrimSizePreset};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(store: &mut WorkbookStore) -> Rc<RefCell<Vec<AppWorkspaceState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |state: &AppWorkspaceState| sink.borrow_mut().push(state.clone()));
        seen
    }

    #[test]
    fn test_open_empty_storage_gives_defaults_without_writing() {
        let store = WorkbookStore::open(MemoryStorage::new());
        assert_eq!(store.state().workbook_blocks.len(), 5);
        assert_eq!(store.selected_block().map(|b| b.block_id().as_str()), Some("block_1"));
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_mutations_persist_and_reload_equal() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        store.set_active_ui_language_code(UiLanguageCode::Ru);
        store.update_document_settings(DocumentSettingsPatch::new().trim_size(TrimSizePreset::Trim5x8).page_count(10));
        let added = store.add_workbook_block(BlockType::CalloutBox);
        assert_eq!(store.storage().write_count(), 3);

        let expected = store.state().clone();
        let reopened = WorkbookStore::open(store.into_storage());
        assert_eq!(reopened.state(), &expected);
        assert_eq!(reopened.state().selected_workbook_block_id, added);
        assert_eq!(reopened.state().document_settings.gutter_width_millimeters(), 2.5);
    }

    #[test]
    fn test_reload_resynchronizes_block_ids() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        store.add_workbook_block(BlockType::Paragraph);
        store.add_workbook_block(BlockType::Paragraph);

        let mut reopened = WorkbookStore::open(store.into_storage());
        let added = reopened.add_workbook_block(BlockType::Heading);
        assert_eq!(added, Some(BlockId::from("block_8")));
        assert_eq!(reopened.state().block_ids().len(), 8);
    }

    #[test]
    fn test_reload_with_mixed_ids_never_collides() {
        let stored = serde_json::json!({
            "workbookBlocks": [
                { "blockId": "intro", "blockType": "heading", "headingText": "Intro" },
                { "blockId": "block_9", "blockType": "pageBreak", "pageBreakNote": "" },
                { "blockId": "block_x12", "blockType": "paragraph", "paragraphText": "" },
                { "blockId": "block_4", "blockType": "paragraph", "paragraphText": "" }
            ]
        });
        let storage = MemoryStorage::with_value(STORAGE_KEY, &stored.to_string());

        let mut store = WorkbookStore::open(storage);
        assert_eq!(store.add_workbook_block(BlockType::Heading), Some(BlockId::from("block_10")));

        let mut reopened = WorkbookStore::open(store.into_storage());
        assert_eq!(reopened.add_workbook_block(BlockType::Heading), Some(BlockId::from("block_11")));

        let ids = reopened.state().block_ids();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_exhausted_ids_reject_new_blocks() {
        let stored = serde_json::json!({
            "workbookBlocks": [
                { "blockId": "block_18446744073709551615", "blockType": "paragraph", "paragraphText": "" }
            ]
        });
        let storage = MemoryStorage::with_value(STORAGE_KEY, &stored.to_string());
        let mut store = WorkbookStore::open(storage);
        let seen = recorder(&mut store);

        assert_eq!(store.add_workbook_block(BlockType::Paragraph), None);
        assert_eq!(store.state().workbook_blocks.len(), 1);
        assert!(seen.borrow().is_empty());
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_malformed_snapshot_falls_back_to_defaults() {
        let storage = MemoryStorage::with_value(STORAGE_KEY, "{\"workbookBlocks\": 7");
        let store = WorkbookStore::open(storage);
        let mut ids = BlockIdAllocator::new();
        assert_eq!(store.state(), &AppWorkspaceState::initial(&mut ids));
    }

    #[test]
    fn test_subscribers_notified_in_order() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 1..=3 {
            let order = Rc::clone(&order);
            store.subscribe(move |_: &AppWorkspaceState| order.borrow_mut().push(n));
        }

        store.set_active_theme_mode(ThemeMode::Dark);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = store.subscribe(move |_: &AppWorkspaceState| *sink.borrow_mut() += 1);

        store.set_active_workspace_tab(WorkspaceTab::Preview);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_active_workspace_tab(WorkspaceTab::Editor);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_quota_failure_still_broadcasts() {
        let mut store = WorkbookStore::open(MemoryStorage::with_quota(8));
        let seen = recorder(&mut store);

        store.update_preview_overlay_visibility(OverlayVisibilityPatch::single(OverlayKind::Bleed, true));

        assert!(store.state().preview_overlay_visibility.is_bleed_visible);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(store.storage().write_count(), 0);
        assert!(matches!(store.persist_error(), Some(StorageError::QuotaExceeded { .. })));
    }

    #[test]
    fn test_boundary_move_still_publishes() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        let seen = recorder(&mut store);
        let before = store.state().clone();

        store.reorder_workbook_block_by_direction(BlockId::from("block_1"), MoveDirection::Up);
        assert_eq!(store.state(), &before);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_rejected_patch_neither_persists_nor_broadcasts() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        let seen = recorder(&mut store);

        let patch = BlockFieldPatch::Heading {
            heading_text: Some("Wrong kind".to_string()),
        };
        assert!(store.update_selected_block_fields(patch).is_err());
        assert!(seen.borrow().is_empty());
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_dangling_selection_skips_field_updates() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        store.select_workbook_block(BlockId::from("block_404"));
        assert!(store.selected_block().is_none());

        let mut fields = Map::new();
        fields.insert("headingText".to_string(), Value::from("x"));
        assert_eq!(store.update_selected_block_field_map(&fields), Ok(false));
    }

    #[test]
    fn test_field_map_updates_selected_block() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        store.select_workbook_block(BlockId::from("block_5"));

        let mut fields = Map::new();
        fields.insert("answerLineCount".to_string(), Value::from("abc"));
        assert_eq!(store.update_selected_block_field_map(&fields), Ok(true));
        assert_eq!(store.selected_block().map(|b| b.block_type()), Some(BlockType::AnswerLines));

        assert_eq!(store.update_selected_block_field("answerLineCount", "7"), Ok(true));
        let json = serde_json::to_value(store.selected_block().unwrap()).unwrap();
        assert_eq!(json["answerLineCount"], 7);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut store = WorkbookStore::open(MemoryStorage::new());
        store.add_workbook_block(BlockType::PageBreak);
        store.set_active_theme_mode(ThemeMode::Dark);
        store.reset();

        let mut ids = BlockIdAllocator::new();
        assert_eq!(store.state(), &AppWorkspaceState::initial(&mut ids));
        assert_eq!(store.add_workbook_block(BlockType::Heading), Some(BlockId::from("block_7")));
    }
}
