use ai_builder_model::{Backend, Credential, Provider};

use super::Session;
use crate::backend_client::BackendClient;

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(crate) backend: BackendClient,
    pub(crate) credential: Credential,
    pub(crate) provider: Provider,
    pub(crate) on_change: Option<Box<dyn Fn() + Send + Sync>>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified backend and the credential
    /// of the signed-in user.
    #[inline]
    pub fn with_backend<B: Backend + 'static>(
        backend: B,
        credential: Credential,
    ) -> Self {
        Self {
            backend: BackendClient::new(backend),
            credential,
            provider: Provider::default(),
            on_change: None,
        }
    }

    /// Sets the initially selected provider.
    #[inline]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Attaches a callback to be invoked after every committed state
    /// change.
    ///
    /// The callback runs with no lock held, so it may call back into the
    /// session, e.g. to take a [`snapshot`](Session::snapshot).
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> Session {
        Session::from_builder(self)
    }
}
