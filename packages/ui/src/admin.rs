//! # User admin state and reducer
//!
//! [`AdminState`] is the single owned state object behind the users page: the
//! list snapshot ([`UserList`]), the pending create form ([`CreateUserForm`]) and
//! whether the create drawer is open. It only changes through
//! [`AdminState::update`], which takes a [`Message`] and answers with an
//! [`Effect`] describing the store call (if any) the caller must perform. The
//! result of that call comes back as another message.
//!
//! ```text
//! Load / Refresh ─► Effect::Fetch(ticket) ─► store.list_users ─► UsersLoaded
//! Submit         ─► Effect::Create(payload) ─► store.create_user ─► Created
//! ```
//!
//! The Dioxus view drives this loop from a `Signal<AdminState>`; [`UserAdmin`]
//! drives it headlessly for tests and tooling.

use store::{AvatarFile, CreateUserPayload, ListQuery, StoreError, UserRecord, UserStore};
use tracing::{debug, info};

use crate::user_form::{AvatarError, CreateUserForm, FormField};
use crate::user_list::{FetchMode, FetchTicket, UserList};

/// Everything that can happen on the users page.
#[derive(Clone, Debug)]
pub enum Message {
    Load,
    Refresh,
    UsersLoaded(FetchTicket, Result<Vec<UserRecord>, StoreError>),

    OpenCreate,
    CloseCreate,
    FieldChanged(FormField, String),
    AvatarSelected(AvatarFile),
    AvatarRejected(AvatarError),
    AvatarCleared,
    Submit,
    Created(Result<UserRecord, StoreError>),
}

impl Message {
    /// Returns a display string with password values masked.
    pub fn sanitized_display(&self) -> String {
        match self {
            Self::FieldChanged(field, _) if field.is_secret() => {
                format!("FieldChanged({field:?}, ***)")
            }
            Self::UsersLoaded(ticket, Ok(users)) => {
                format!("UsersLoaded({:?}, Ok({} users))", ticket.mode(), users.len())
            }
            _ => format!("{:?}", self),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "Users::Load",
            Self::Refresh => "Users::Refresh",
            Self::UsersLoaded(..) => "Users::UsersLoaded",
            Self::OpenCreate => "Users::OpenCreate",
            Self::CloseCreate => "Users::CloseCreate",
            Self::FieldChanged(..) => "Users::FieldChanged",
            Self::AvatarSelected(_) => "Users::AvatarSelected",
            Self::AvatarRejected(_) => "Users::AvatarRejected",
            Self::AvatarCleared => "Users::AvatarCleared",
            Self::Submit => "Users::Submit",
            Self::Created(_) => "Users::Created",
        }
    }
}

/// Store work requested by [`AdminState::update`].
#[derive(Clone, Debug)]
pub enum Effect {
    None,
    Fetch(FetchTicket),
    Create(CreateUserPayload),
}

/// State of the users page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminState {
    pub list: UserList,
    pub form: CreateUserForm,
    create_open: bool,
}

impl AdminState {
    /// Fresh page state accepting avatars up to `max_avatar_bytes`.
    pub fn new(max_avatar_bytes: u64) -> Self {
        Self {
            list: UserList::default(),
            form: CreateUserForm::new(max_avatar_bytes),
            create_open: false,
        }
    }

    /// Whether the create drawer is showing.
    pub fn is_create_open(&self) -> bool {
        self.create_open
    }

    pub fn update(&mut self, message: Message) -> Effect {
        debug!("users update: {}", message.name());
        match message {
            Message::Load => Effect::Fetch(self.list.begin_fetch(FetchMode::Initial)),
            Message::Refresh => Effect::Fetch(self.list.begin_fetch(FetchMode::Refresh)),
            Message::UsersLoaded(ticket, result) => {
                self.list.finish_fetch(ticket, result);
                Effect::None
            }

            Message::OpenCreate => {
                self.create_open = true;
                Effect::None
            }
            Message::CloseCreate => {
                if self.form.is_creating() {
                    debug!("close ignored while a create is in flight");
                } else {
                    self.create_open = false;
                    self.form.reset();
                }
                Effect::None
            }
            Message::FieldChanged(field, value) => {
                self.form.set_field(field, value);
                Effect::None
            }
            Message::AvatarSelected(file) => {
                if let Err(err) = self.form.set_avatar_file(file) {
                    debug!("avatar not staged: {err}");
                }
                Effect::None
            }
            Message::AvatarRejected(err) => {
                self.form.reject_avatar(err);
                Effect::None
            }
            Message::AvatarCleared => {
                self.form.clear_avatar();
                Effect::None
            }
            Message::Submit => match self.form.begin_submit() {
                Some(payload) => Effect::Create(payload),
                None => Effect::None,
            },
            Message::Created(result) => {
                if let Some(user) = self.form.finish_submit(result) {
                    info!(id = %user.id, "user created");
                    self.list.record_created(user);
                    self.create_open = false;
                }
                Effect::None
            }
        }
    }
}

/// Carry out `effect` against `store` and return the message with its outcome.
pub async fn perform<S: UserStore>(store: &S, query: &ListQuery, effect: Effect) -> Option<Message> {
    match effect {
        Effect::None => None,
        Effect::Fetch(ticket) => Some(Message::UsersLoaded(ticket, store.list_users(query).await)),
        Effect::Create(payload) => Some(Message::Created(store.create_user(payload).await)),
    }
}

/// Headless driver: an [`AdminState`] wired to a store.
pub struct UserAdmin<S: UserStore> {
    store: S,
    query: ListQuery,
    state: AdminState,
}

impl<S: UserStore> UserAdmin<S> {
    pub fn new(store: S, query: ListQuery, state: AdminState) -> Self {
        Self {
            store,
            query,
            state,
        }
    }

    pub fn state(&self) -> &AdminState {
        &self.state
    }

    /// Apply `message` and every follow-up message its effects produce.
    pub async fn dispatch(&mut self, message: Message) {
        let mut next = Some(message);
        while let Some(message) = next.take() {
            let effect = self.state.update(message);
            next = perform(&self.store, &self.query, effect).await;
        }
    }

    pub async fn load(&mut self) {
        self.dispatch(Message::Load).await
    }

    pub async fn refresh(&mut self) {
        self.dispatch(Message::Refresh).await
    }

    pub async fn submit(&mut self) {
        self.dispatch(Message::Submit).await
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.state.update(Message::FieldChanged(field, value.into()));
    }

    /// Offer `file` as the avatar. A refusal shows up in `form.avatar_error()`.
    pub fn set_avatar_file(&mut self, file: AvatarFile) {
        self.state.update(Message::AvatarSelected(file));
    }

    pub fn open_create(&mut self) {
        self.state.update(Message::OpenCreate);
    }

    pub fn close_create(&mut self) {
        self.state.update(Message::CloseCreate);
    }
}
