//! Top-level controller.
//!
//! Switches between the login view and the analysis view. The analysis
//! session only exists while logged in; logging out drops it, which cancels
//! any in-flight run.

use crate::analysis::{AnalysisSession, AnalysisSimulator};
use crate::auth::AuthGate;
use crate::error::{AppError, AppResult};
use tracing::info;

/// Which view is active.
#[derive(Debug)]
pub enum View {
    Login,
    Analysis(AnalysisSession),
}

/// Owns the login flag (as the active view) and the session.
#[derive(Debug)]
pub struct AppController<A: AuthGate> {
    auth: A,
    simulator: AnalysisSimulator,
    view: View,
}

impl<A: AuthGate> AppController<A> {
    pub fn new(auth: A, simulator: AnalysisSimulator) -> Self {
        Self {
            auth,
            simulator,
            view: View::Login,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.view, View::Analysis(_))
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Log in and open an idle session.
    pub fn login(&mut self, email: &str, password: &str) -> AppResult<&mut AnalysisSession> {
        if !self.auth.attempt_login(email, password) {
            return Err(AppError::AuthRejected);
        }
        info!("Logged in as {}", email);
        Ok(self.open_session())
    }

    /// Create an account and open an idle session.
    pub fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<&mut AnalysisSession> {
        if !self.auth.attempt_signup(name, email, password) {
            return Err(AppError::AuthRejected);
        }
        info!("Signed up {} <{}>", name, email);
        Ok(self.open_session())
    }

    /// Return to the login view, discarding the session.
    pub fn logout(&mut self) {
        if self.is_logged_in() {
            info!("Logged out");
        }
        self.view = View::Login;
    }

    /// The active session, if logged in.
    pub fn session(&mut self) -> AppResult<&mut AnalysisSession> {
        match &mut self.view {
            View::Analysis(session) => Ok(session),
            View::Login => Err(AppError::NotAuthenticated),
        }
    }

    fn open_session(&mut self) -> &mut AnalysisSession {
        // A repeated login keeps the running session.
        match self.view {
            View::Analysis(ref mut session) => session,
            View::Login => {
                self.view = View::Analysis(AnalysisSession::new(self.simulator.clone()));
                self.open_session()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SessionPhase;
    use crate::auth::MockAuthGate;
    use crate::models::ImageRef;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn controller() -> AppController<MockAuthGate> {
        AppController::new(MockAuthGate, AnalysisSimulator::default())
    }

    #[test]
    fn test_starts_on_login_view() {
        let mut app = controller();
        assert!(!app.is_logged_in());
        assert!(matches!(assert_err!(app.session()), AppError::NotAuthenticated));
    }

    #[test]
    fn test_rejected_login_stays_on_login_view() {
        let mut app = controller();
        assert!(matches!(
            assert_err!(app.login("", "pw")),
            AppError::AuthRejected
        ));
        assert!(!app.is_logged_in());
    }

    #[test]
    fn test_login_opens_idle_session() {
        let mut app = controller();
        let session = assert_ok!(app.login("a@b.c", "pw"));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(app.is_logged_in());
    }

    #[test]
    fn test_signup_opens_session() {
        let mut app = controller();
        assert_ok!(app.signup("Ada", "a@b.c", "pw"));
        assert!(app.is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_login_keeps_session() {
        let mut app = controller();
        let session = assert_ok!(app.login("a@b.c", "pw"));
        session.stage_image(ImageRef::new("x.png", "data:image/png;base64,AA=="));
        let run = assert_ok!(session.start_analysis());

        let session = assert_ok!(app.login("a@b.c", "pw"));
        assert_eq!(session.phase(), SessionPhase::Analyzing);
        assert_eq!(session.current_run(), Some(run));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_cancels_run() {
        let mut app = controller();
        let session = assert_ok!(app.login("a@b.c", "pw"));
        session.stage_image(ImageRef::new("x.png", "data:image/png;base64,AA=="));
        assert_ok!(session.start_analysis());

        app.logout();
        assert!(!app.is_logged_in());
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let session = assert_ok!(app.login("a@b.c", "pw"));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.drain_pending(), 0);
    }
}
