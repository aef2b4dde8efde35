/// Explicit state container with change notification.
///
/// Stores are constructed by the owner (the app or a test) and handed to
/// whoever needs them; there is no process-global instance. Every mutation
/// goes through [`Store::update`], which notifies subscribers after the
/// closure returns.
pub struct Store<S> {
    state: S,
    listeners: Vec<Box<dyn FnMut(&S)>>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S> Store<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> &S {
        &self.state
    }

    /// Register a change listener. Listeners run in subscription order,
    /// after the state mutation has completed.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&S) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Apply a mutation and notify all subscribers with the new state.
    pub fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut S),
    {
        mutate(&mut self.state);
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl<S: Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
