//! Interaction state for one open family tree.
//!
//! A [`Session`] owns the last loaded snapshot and its layout together with
//! selection, context menu, modal and drag state. Gestures are plain
//! synchronous methods; anything that talks to the store is `async` and ends
//! with a full reload, never a local patch of the snapshot.

mod forms;

pub use forms::{FormError, Modal, ModalKind, PersonOption};

use tracing::{debug, info, instrument, warn};

use crate::config::LayoutConfig;
use crate::index::{self, PersonRelationships};
use crate::layout::{EdgeKind, TreeLayout, compute_layout};
use crate::model::{
    FamilyGraph, ParentOf, ParentOfInput, Person, PersonInput, Position, Union, UnionInput,
};
use crate::store::{GraphStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("no {expected} dialog is open")]
    ModalMismatch { expected: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    /// Message shown next to the retry affordance.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    Person(String),
    Union(Union),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub person_id: String,
    /// Screen coordinates of the gesture.
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    AddChild,
    AddSpouse,
    AddParent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub person_id: String,
    pub origin: Position,
    pub current: Position,
}

/// Identifies one graph load. Only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// A position write produced by a finished drag.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSave {
    pub person_id: String,
    pub position: Position,
}

impl PositionSave {
    /// Best effort: a failed write is logged and dropped. The next drag of the
    /// same node writes again.
    pub async fn persist<S: GraphStore>(&self, store: &S) {
        match store
            .set_person_position(&self.person_id, self.position.x, self.position.y)
            .await
        {
            Ok(_) => debug!(person = %self.person_id, "position saved"),
            Err(err) => warn!(person = %self.person_id, error = %err, "failed to save node position"),
        }
    }
}

pub struct Session<S> {
    store: S,
    layout_config: LayoutConfig,
    graph: FamilyGraph,
    layout: TreeLayout,
    load_state: LoadState,
    last_ticket: u64,
    selection: Selection,
    context_menu: Option<ContextMenu>,
    modal: Option<Modal>,
    drag: Option<DragState>,
    delete_error: Option<String>,
    fit_requested: bool,
}

impl<S: GraphStore> Session<S> {
    /// A session that has not loaded anything yet. Call [`Session::reload`]
    /// to fetch the first snapshot.
    pub fn new(store: S, layout_config: LayoutConfig) -> Self {
        Self {
            store,
            layout_config,
            graph: FamilyGraph::default(),
            layout: TreeLayout::default(),
            load_state: LoadState::Loading,
            last_ticket: 0,
            selection: Selection::None,
            context_menu: None,
            modal: None,
            drag: None,
            delete_error: None,
            fit_requested: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn delete_error(&self) -> Option<&str> {
        self.delete_error.as_deref()
    }

    /// Returns true once after each successful load that the renderer
    /// should answer with a fit-to-view.
    pub fn take_fit_request(&mut self) -> bool {
        std::mem::take(&mut self.fit_requested)
    }

    pub fn selected_person(&self) -> Option<&Person> {
        match &self.selection {
            Selection::Person(id) => self.graph.person(id),
            _ => None,
        }
    }

    pub fn selected_union(&self) -> Option<&Union> {
        match &self.selection {
            Selection::Union(union) => Some(union),
            _ => None,
        }
    }

    /// Parents, children and partners of the selected person, for the
    /// detail panel.
    pub fn selected_relationships(&self) -> Option<PersonRelationships<'_>> {
        let person = self.selected_person()?;
        Some(index::relationships(&self.graph, &person.id))
    }

    // Loading

    pub fn begin_load(&mut self) -> LoadTicket {
        self.last_ticket += 1;
        self.load_state = LoadState::Loading;
        LoadTicket(self.last_ticket)
    }

    /// Applies a finished load. Returns false and leaves the session alone
    /// when a newer load has been started since `ticket` was issued.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FamilyGraph, StoreError>,
    ) -> bool {
        if ticket.0 != self.last_ticket {
            debug!(ticket = ticket.0, newest = self.last_ticket, "dropping stale graph load");
            return false;
        }
        match result {
            Ok(graph) => {
                self.layout = compute_layout(&graph, &self.layout_config);
                self.graph = graph;
                self.prune_selection();
                self.load_state = LoadState::Loaded;
                self.fit_requested = true;
                info!(
                    persons = self.graph.nodes.len(),
                    parent_of = self.graph.parent_of.len(),
                    unions = self.graph.unions.len(),
                    "family tree loaded"
                );
            }
            Err(err) => {
                warn!(error = %err, "failed to load family tree");
                self.load_state = LoadState::Error(err.user_message());
            }
        }
        true
    }

    /// Fetches a fresh snapshot. Also the retry affordance after an error.
    #[instrument(skip_all)]
    pub async fn reload(&mut self) {
        let ticket = self.begin_load();
        let result = self.store.get_graph().await;
        self.finish_load(ticket, result);
    }

    fn prune_selection(&mut self) {
        let keep = match &self.selection {
            Selection::None => true,
            Selection::Person(id) => self.graph.contains(id),
            Selection::Union(union) => self
                .graph
                .unions
                .iter()
                .any(|candidate| candidate.edge_id() == union.edge_id()),
        };
        if !keep {
            self.selection = Selection::None;
        }
        let stale_menu = self
            .context_menu
            .as_ref()
            .is_some_and(|menu| !self.graph.contains(&menu.person_id));
        if stale_menu {
            self.context_menu = None;
        }
    }

    // Pointer gestures

    pub fn activate_node(&mut self, person_id: &str) {
        if !self.graph.contains(person_id) {
            return;
        }
        self.selection = Selection::Person(person_id.to_string());
        self.context_menu = None;
    }

    pub fn open_context_menu(&mut self, person_id: &str, x: f32, y: f32) {
        if !self.graph.contains(person_id) {
            return;
        }
        self.context_menu = Some(ContextMenu {
            person_id: person_id.to_string(),
            x,
            y,
        });
    }

    /// Opens the edit dialog pre-filled with the person's current fields.
    pub fn double_activate_node(&mut self, person_id: &str) {
        if let Some(person) = self.graph.person(person_id) {
            self.modal = Some(Modal::edit(person));
        }
    }

    /// Selects the union behind `edge_id`. Parent edges carry no detail view
    /// and are ignored.
    pub fn activate_edge(&mut self, edge_id: &str) {
        let is_union = self
            .layout
            .edges
            .iter()
            .any(|edge| edge.id == edge_id && edge.kind == EdgeKind::Union);
        if !is_union {
            return;
        }
        if let Some(union) = self.graph.union_by_edge_id(edge_id) {
            self.selection = Selection::Union(union.clone());
        }
    }

    pub fn activate_background(&mut self) {
        self.selection = Selection::None;
        self.context_menu = None;
    }

    pub fn click_outside_menu(&mut self) {
        self.context_menu = None;
    }

    pub fn close_details(&mut self) {
        self.selection = Selection::None;
    }

    pub fn choose_context_action(&mut self, action: ContextAction) {
        let Some(menu) = self.context_menu.take() else {
            return;
        };
        let id = menu.person_id.as_str();
        self.modal = Some(match action {
            ContextAction::AddChild => Modal::parent_of(Some(id), None),
            ContextAction::AddSpouse => Modal::union_with(Some(id)),
            ContextAction::AddParent => Modal::parent_of(None, Some(id)),
        });
    }

    // Affordances

    pub fn open_create_person(&mut self) {
        self.modal = Some(Modal::CreatePerson);
    }

    pub fn open_create_union(&mut self) {
        self.modal = Some(Modal::union_with(None));
    }

    pub fn open_create_parent_of(&mut self) {
        self.modal = Some(Modal::parent_of(None, None));
    }

    pub fn edit_selected(&mut self) {
        if let Some(person) = self.selected_person() {
            self.modal = Some(Modal::edit(person));
        }
    }

    pub fn request_delete_selected(&mut self) {
        if let Some(person) = self.selected_person() {
            self.modal = Some(Modal::confirm_delete(person));
            self.delete_error = None;
        }
    }

    pub fn cancel_modal(&mut self) {
        self.modal = None;
        self.delete_error = None;
    }

    /// People offered as endpoints in the relationship dialogs.
    pub async fn person_options(&self) -> Result<Vec<PersonOption>, StoreError> {
        let persons = self.store.list_persons().await?;
        Ok(persons.iter().map(PersonOption::from_person).collect())
    }

    // Submissions

    /// Creates a person, or updates one when the edit dialog is open.
    #[instrument(skip_all)]
    pub async fn submit_person(&mut self, input: PersonInput) -> Result<Person, SessionError> {
        let person = match &self.modal {
            Some(Modal::CreatePerson) => self.store.create_person(&input).await?,
            Some(Modal::EditPerson { person_id, .. }) => {
                self.store.update_person(person_id, &input).await?
            }
            _ => return Err(SessionError::ModalMismatch { expected: "person" }),
        };
        info!(person = %person.id, "person saved");
        self.close_after_submit().await;
        Ok(person)
    }

    #[instrument(skip_all)]
    pub async fn submit_union(&mut self, input: UnionInput) -> Result<Union, SessionError> {
        if !matches!(self.modal, Some(Modal::CreateUnion { .. })) {
            return Err(SessionError::ModalMismatch { expected: "union" });
        }
        forms::check_union(&input)?;
        let union = self.store.create_union(&input).await?;
        info!(edge = %union.edge_id(), status = union.status.as_str(), "union created");
        self.close_after_submit().await;
        Ok(union)
    }

    #[instrument(skip_all)]
    pub async fn submit_parent_of(
        &mut self,
        input: ParentOfInput,
    ) -> Result<ParentOf, SessionError> {
        if !matches!(self.modal, Some(Modal::CreateParentOf { .. })) {
            return Err(SessionError::ModalMismatch {
                expected: "parent-of",
            });
        }
        forms::check_parent_of(&input)?;
        let rel = self.store.create_parent_of(&input).await?;
        info!(edge = %rel.edge_id(), "parent-of relationship created");
        self.close_after_submit().await;
        Ok(rel)
    }

    /// Deletes the person named by the confirm dialog.
    ///
    /// A failure is kept as an inline message and the dialog stays open; the
    /// rest of the session is untouched.
    #[instrument(skip_all)]
    pub async fn confirm_delete(&mut self) -> Result<(), SessionError> {
        let Some(Modal::ConfirmDelete { person_id, .. }) = &self.modal else {
            return Err(SessionError::ModalMismatch { expected: "delete" });
        };
        let person_id = person_id.clone();
        if let Err(err) = self.store.delete_person(&person_id).await {
            warn!(person = %person_id, error = %err, "failed to delete person");
            self.delete_error = Some(err.user_message());
            return Ok(());
        }
        info!(person = %person_id, "person deleted");
        self.modal = None;
        self.delete_error = None;
        self.selection = Selection::None;
        self.reload().await;
        Ok(())
    }

    /// Drops the persisted position of the selected person so the automatic
    /// layout places it again.
    #[instrument(skip_all)]
    pub async fn reset_selected_position(&mut self) -> Result<(), SessionError> {
        let Some(id) = self.selected_person().map(|person| person.id.clone()) else {
            return Ok(());
        };
        // A drag pins the box before the snapshot catches up.
        if !self.layout.node(&id).is_some_and(|node| node.pinned) {
            return Ok(());
        }
        self.store.clear_person_position(&id).await?;
        self.reload().await;
        Ok(())
    }

    async fn close_after_submit(&mut self) {
        self.modal = None;
        self.reload().await;
    }

    // Dragging

    pub fn start_drag(&mut self, person_id: &str) {
        let Some(origin) = self.layout.position(person_id) else {
            return;
        };
        self.drag = Some(DragState {
            person_id: person_id.to_string(),
            origin,
            current: origin,
        });
    }

    pub fn drag_to(&mut self, position: Position) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        drag.current = position;
        self.layout.move_node(&drag.person_id, position);
    }

    /// Ends the drag at `position` and returns the write to issue. The node
    /// keeps its new place whatever happens to the write.
    pub fn finish_drag(&mut self, position: Position) -> Option<PositionSave> {
        let drag = self.drag.take()?;
        self.layout.move_node(&drag.person_id, position);
        Some(PositionSave {
            person_id: drag.person_id,
            position,
        })
    }

    /// [`Session::finish_drag`] followed by the best-effort write.
    pub async fn end_drag(&mut self, position: Position) {
        if let Some(save) = self.finish_drag(position) {
            save.persist(&self.store).await;
        }
    }
}
