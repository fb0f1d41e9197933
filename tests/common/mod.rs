//! Test helpers for E2E tests.
//!
//! Provides an in-memory ManageMe API, recording views, a scripted dialog
//! and a [`Harness`] wiring them into an [`Application`].

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tokio::sync::oneshot;

use manageme::api::{ApiClient, ApiError, ApiResult, LoginResponse};
use manageme::app::views::{
    Dialog, IntroView, LoginView, MenuView, ProfileView, RegisterView, TaskView, TasksListView,
    UsersListView, Views,
};
use manageme::app::{Application, MenuItem, Navigator, Screen, ScreenContext, ScreenHost, TaskScope};
use manageme::auth::validation::{LoginForm, ProfileForm, RegisterForm};
use manageme::auth::{MemoryStorage, Role, SessionStorage, SessionStore};
use manageme::config::ClientConfig;
use manageme::datetime::FixedClock;
use manageme::model::{
    Deleted, NewUser, Report, Task, TaskDraft, TaskQuery, TaskRow, TimeWindow, User, UserPatch,
};

/// Frozen "now" used by every harness: 2023-11-14 22:13:20 UTC.
pub const NOW: i64 = 1_700_000_000;

/// Secret used to sign test credentials.
pub const TOKEN_SECRET: &[u8] = b"test-secret-key-for-testing-only";

/// Start of the day containing [`NOW`].
pub const TODAY: i64 = NOW - NOW % 86_400;

/// Mint a signed credential for `user_id` expiring at `exp`.
pub fn token_expiring(user_id: &str, exp: i64) -> String {
    encode(
        &Header::default(),
        &json!({ "aud": user_id, "exp": exp, "iss": "manageme" }),
        &EncodingKey::from_secret(TOKEN_SECRET),
    )
    .expect("Failed to sign token")
}

/// Mint a signed credential for `user_id` valid well past [`NOW`].
pub fn token_for(user_id: &str) -> String {
    token_expiring(user_id, NOW + 3600)
}

/// Preferred hours 08:00-17:00.
pub fn office_hours() -> TimeWindow {
    TimeWindow {
        start: 28_800,
        finish: 61_200,
    }
}

fn user(id: &str, username: &str, role: Role, hours: Option<TimeWindow>) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role: role.mask_bits(),
        preferred_hours: hours,
    }
}

/// Seeded admin.
pub fn admin() -> User {
    user("admin1", "admin", Role::Admin, None)
}

/// Seeded regular user with office hours.
pub fn jane() -> User {
    user("jane1", "jane", Role::User, Some(office_hours()))
}

/// Seeded manager without preferred hours.
pub fn bob() -> User {
    user("bob1", "bob", Role::Manager, None)
}

/// Task helper.
pub fn task(id: &str, title: &str, owner: &str, start: i64, finish: i64) -> Task {
    Task {
        id: Some(id.to_string()),
        title: title.to_string(),
        description: format!("{title} notes"),
        user_id: owner.to_string(),
        start,
        finish,
    }
}

struct MockState {
    users: Vec<(User, String)>,
    tasks: Vec<Task>,
    next_id: u32,
}

/// In-memory ManageMe API.
///
/// Every call is logged. Failures can be queued per method with
/// [`MockApi::fail_next`], and a call can be held back until a test
/// releases it with [`MockApi::hold_next`].
pub struct MockApi {
    state: Mutex<MockState>,
    failures: Mutex<HashMap<&'static str, VecDeque<ApiError>>>,
    holds: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockApi {
    /// API seeded with admin, jane and bob (passwords: `<name>pw`).
    pub fn seeded() -> Self {
        Self {
            state: Mutex::new(MockState {
                users: vec![
                    (admin(), "adminpw".to_string()),
                    (jane(), "janepw".to_string()),
                    (bob(), "bobpw".to_string()),
                ],
                tasks: Vec::new(),
                next_id: 1,
            }),
            failures: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a task.
    pub fn add_task(&self, task: Task) {
        self.state.lock().unwrap().tasks.push(task);
    }

    /// Stored tasks.
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }

    /// Stored user, if any.
    pub fn user(&self, id: &str) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
    }

    /// Make the next call of `method` fail with `err`.
    pub fn fail_next(&self, method: &'static str, err: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(err);
    }

    /// Hold the next call of `method` until the returned sender fires.
    pub fn hold_next(&self, method: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(rx);
        tx
    }

    /// Names of the methods called so far.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls of `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| **c == method).count()
    }

    async fn enter(&self, method: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(method);

        let hold = {
            let mut holds = self.holds.lock().unwrap();
            holds.get_mut(method).and_then(|q| q.pop_front())
        };
        if let Some(rx) = hold {
            let _ = rx.await;
        }

        let failure = {
            let mut failures = self.failures.lock().unwrap();
            failures.get_mut(method).and_then(|q| q.pop_front())
        };
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        self.enter("login").await?;
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|(u, pw)| u.username == username && pw == password)
            .map(|(u, _)| LoginResponse {
                credential: token_for(&u.id),
                user: u.clone(),
            })
            .ok_or_else(|| ApiError::Unauthorized("invalid username or password".to_string()))
    }

    async fn register_user(&self, new_user: &NewUser) -> ApiResult<User> {
        self.enter("register_user").await?;
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|(u, _)| u.username == new_user.username) {
            return Err(ApiError::Status {
                status: 400,
                message: "username already taken".to_string(),
            });
        }
        state.next_id += 1;
        let created = User {
            id: format!("u{}", state.next_id),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            role: Role::User.mask_bits(),
            preferred_hours: new_user.preferred_hours,
        };
        state
            .users
            .push((created.clone(), new_user.password.clone()));
        Ok(created)
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.enter("list_users").await?;
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn list_users_by_id(&self) -> ApiResult<HashMap<String, User>> {
        self.enter("list_users_by_id").await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .map(|(u, _)| (u.id.clone(), u.clone()))
            .collect())
    }

    async fn get_user(&self, id: &str) -> ApiResult<User> {
        self.enter("get_user").await?;
        self.user(id).ok_or_else(|| Self::not_found("user"))
    }

    async fn patch_user(&self, id: &str, patch: &UserPatch) -> ApiResult<User> {
        self.enter("patch_user").await?;
        let mut state = self.state.lock().unwrap();
        let (user, password) = state
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or_else(|| Self::not_found("user"))?;

        if let Some(new_password) = &patch.password {
            if patch.old_password.as_deref() != Some(password.as_str()) {
                return Err(ApiError::Status {
                    status: 400,
                    message: "old password is incorrect".to_string(),
                });
            }
            *password = new_password.clone();
        }
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if patch.preferred_hours.is_some() {
            user.preferred_hours = patch.preferred_hours;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> ApiResult<Deleted> {
        self.enter("delete_user").await?;
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|(u, _)| u.id != id);
        if state.users.len() == before {
            return Err(Self::not_found("user"));
        }
        state.tasks.retain(|t| t.user_id != id);
        Ok(Deleted { id: id.to_string() })
    }

    async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<Vec<Task>> {
        self.enter("list_tasks").await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .filter(|t| query.owner.as_deref().map_or(true, |o| t.user_id == o))
            .filter(|t| query.from.map_or(true, |from| t.start >= from))
            .filter(|t| query.to.map_or(true, |to| t.finish <= to))
            .cloned()
            .collect())
    }

    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<Task> {
        self.enter("create_task").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = Task {
            id: Some(format!("t{}", state.next_id)),
            title: draft.title.clone(),
            description: draft.description.clone(),
            user_id: draft.user_id.clone(),
            start: draft.start,
            finish: draft.finish,
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn get_task(&self, id: &str) -> ApiResult<Task> {
        self.enter("get_task").await?;
        let state = self.state.lock().unwrap();
        state
            .tasks
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| Self::not_found("task"))
    }

    async fn patch_task(&self, id: &str, draft: &TaskDraft) -> ApiResult<Task> {
        self.enter("patch_task").await?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(id))
            .ok_or_else(|| Self::not_found("task"))?;
        task.title = draft.title.clone();
        task.description = draft.description.clone();
        task.user_id = draft.user_id.clone();
        task.start = draft.start;
        task.finish = draft.finish;
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> ApiResult<Deleted> {
        self.enter("delete_task").await?;
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id.as_deref() != Some(id));
        if state.tasks.len() == before {
            return Err(Self::not_found("task"));
        }
        Ok(Deleted { id: id.to_string() })
    }
}

/// Views that record what they were told and return scripted input.
#[derive(Default)]
pub struct TestViews {
    /// Banner visibility, once set.
    pub intro_visible: Mutex<Option<bool>>,
    /// Input returned by the login form.
    pub login_form: Mutex<LoginForm>,
    /// Input returned by the registration form.
    pub register_form: Mutex<RegisterForm>,
    /// Input returned by the profile form.
    pub profile_form: Mutex<ProfileForm>,
    /// Input returned by the task form; defaults to the task it was opened on.
    pub task_form: Mutex<Option<TaskDraft>>,
    /// Message returned by every view's own `validate`.
    pub view_error: Mutex<Option<String>>,
    /// Last menu rendering.
    pub menu: Mutex<Option<(User, Vec<MenuItem>)>>,
    /// Last profile rendering and whether the role field was shown.
    pub profile: Mutex<Option<(User, bool)>>,
    /// Last user list rendering.
    pub users: Mutex<Vec<User>>,
    /// Last task rendering with owner-editable and deletable flags.
    pub task: Mutex<Option<(Task, bool, bool)>>,
    /// Every task list rendering.
    pub task_lists: Mutex<Vec<(Vec<TaskRow>, TaskScope)>>,
    /// Exported reports.
    pub reports: Mutex<Vec<Report>>,
    /// Names of the forms cleared so far.
    pub cleared: Mutex<Vec<&'static str>>,
}

impl TestViews {
    /// Rows of the most recent task list rendering.
    pub fn last_rows(&self) -> Vec<TaskRow> {
        self.task_lists
            .lock()
            .unwrap()
            .last()
            .map(|(rows, _)| rows.clone())
            .unwrap_or_default()
    }

    /// Bundle into [`Views`].
    pub fn bundle(self: &Arc<Self>) -> Views {
        Views {
            intro: self.clone(),
            login: self.clone(),
            register: self.clone(),
            menu: self.clone(),
            profile: self.clone(),
            users: self.clone(),
            task: self.clone(),
            tasks: self.clone(),
        }
    }
}

impl IntroView for TestViews {
    fn show(&self) {
        *self.intro_visible.lock().unwrap() = Some(true);
    }

    fn hide(&self) {
        *self.intro_visible.lock().unwrap() = Some(false);
    }
}

impl LoginView for TestViews {
    fn validate(&self) -> Option<String> {
        self.view_error.lock().unwrap().clone()
    }

    fn read(&self) -> LoginForm {
        self.login_form.lock().unwrap().clone()
    }

    fn clear(&self) {
        *self.login_form.lock().unwrap() = LoginForm::default();
        self.cleared.lock().unwrap().push("login");
    }
}

impl RegisterView for TestViews {
    fn read(&self) -> RegisterForm {
        self.register_form.lock().unwrap().clone()
    }

    fn clear(&self) {
        *self.register_form.lock().unwrap() = RegisterForm::default();
        self.cleared.lock().unwrap().push("register");
    }
}

impl MenuView for TestViews {
    fn init(&self, user: &User, items: &[MenuItem]) {
        *self.menu.lock().unwrap() = Some((user.clone(), items.to_vec()));
    }
}

impl ProfileView for TestViews {
    fn init(&self, user: &User, role_editable: bool) {
        *self.profile.lock().unwrap() = Some((user.clone(), role_editable));
    }

    fn read(&self) -> ProfileForm {
        self.profile_form.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.cleared.lock().unwrap().push("profile");
    }
}

impl UsersListView for TestViews {
    fn init(&self, users: &[User]) {
        *self.users.lock().unwrap() = users.to_vec();
    }
}

impl TaskView for TestViews {
    fn init(&self, task: &Task, owner_editable: bool, deletable: bool) {
        *self.task.lock().unwrap() = Some((task.clone(), owner_editable, deletable));
    }

    fn validate(&self) -> Option<String> {
        self.view_error.lock().unwrap().clone()
    }

    fn read(&self) -> TaskDraft {
        if let Some(draft) = self.task_form.lock().unwrap().clone() {
            return draft;
        }
        let task = self.task.lock().unwrap().clone();
        task.map(|(t, _, _)| TaskDraft::from(&t))
            .unwrap_or_else(|| TaskDraft {
                title: String::new(),
                description: String::new(),
                user_id: String::new(),
                start: 0,
                finish: 0,
            })
    }

    fn clear(&self) {
        *self.task_form.lock().unwrap() = None;
        self.cleared.lock().unwrap().push("task");
    }
}

impl TasksListView for TestViews {
    fn init(&self, rows: &[TaskRow], scope: TaskScope) {
        self.task_lists
            .lock()
            .unwrap()
            .push((rows.to_vec(), scope));
    }

    fn export(&self, report: &Report) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

/// Dialog with scripted answers.
#[derive(Default)]
pub struct ScriptedDialog {
    /// Messages shown so far.
    pub alerts: Mutex<Vec<String>>,
    /// Questions asked so far.
    pub prompts: Mutex<Vec<String>>,
    /// Answers handed out to prompts, in order. Empty queue means "cancel".
    pub answers: Mutex<VecDeque<Option<String>>>,
    /// Answer to every confirmation.
    pub confirm_answer: Mutex<bool>,
}

impl ScriptedDialog {
    /// Queue an answer for the next prompt.
    pub fn answer(&self, answer: Option<&str>) {
        self.answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
    }

    /// Messages shown so far.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    /// Last message shown.
    pub fn last_alert(&self) -> Option<String> {
        self.alerts.lock().unwrap().last().cloned()
    }
}

impl Dialog for ScriptedDialog {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn prompt(&self, message: &str) -> Option<String> {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().flatten()
    }

    fn confirm(&self, _message: &str) -> bool {
        *self.confirm_answer.lock().unwrap()
    }
}

/// Screen host recording every presentation.
#[derive(Default)]
pub struct RecordingHost {
    /// Screens presented, in order.
    pub presented: Mutex<Vec<Screen>>,
}

impl ScreenHost for RecordingHost {
    fn present(&self, screen: Screen) {
        self.presented.lock().unwrap().push(screen);
    }
}

/// An [`Application`] wired to test doubles.
pub struct Harness {
    pub app: Application,
    pub api: Arc<MockApi>,
    pub views: Arc<TestViews>,
    pub dialog: Arc<ScriptedDialog>,
    pub host: Arc<RecordingHost>,
    pub storage: Arc<MemoryStorage>,
}

impl Harness {
    /// Fresh harness over a seeded API and empty storage.
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Fresh harness over a seeded API and the given storage.
    pub fn with_storage(storage: Arc<MemoryStorage>) -> Self {
        let api = Arc::new(MockApi::seeded());
        let views = Arc::new(TestViews::default());
        let dialog = Arc::new(ScriptedDialog::default());
        let host = Arc::new(RecordingHost::default());

        let backend: Arc<dyn SessionStorage> = storage.clone();
        let ctx = ScreenContext::new(
            Arc::new(SessionStore::new(backend)),
            Arc::new(Navigator::new(host.clone())),
            api.clone(),
            views.bundle(),
            dialog.clone(),
            Arc::new(FixedClock::at(NOW, chrono_tz::UTC)),
            ClientConfig::default(),
        );

        Self {
            app: Application::new(ctx),
            api,
            views,
            dialog,
            host,
            storage,
        }
    }

    /// Harness already signed in as `username`.
    pub async fn signed_in(username: &str) -> Self {
        let harness = Self::new();
        harness.login(username, &format!("{username}pw")).await;
        assert_eq!(harness.app.current_screen(), Screen::Menu);
        harness
    }

    /// Fill the login form and submit it. The outcome is left to the caller.
    pub async fn login(&self, username: &str, password: &str) {
        *self.views.login_form.lock().unwrap() = LoginForm::new(username, password);
        let _ = self.app.login().await;
    }

    /// ID of the signed-in user.
    pub fn user_id(&self) -> Option<String> {
        self.app.session().get().map(|s| s.user.id)
    }
}
