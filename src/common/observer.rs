use std::fmt;

type Callback<T> = Box<dyn FnMut(&T) + Send>;

/// Render callbacks invoked after every committed mutation.
pub struct Observers<T> {
    callbacks: Vec<Callback<T>>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl<T> Observers<T> {
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn notify(&mut self, state: &T) {
        for cb in self.callbacks.iter_mut() {
            cb(state);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
