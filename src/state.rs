use crate::{config::RuntimeConfiguration, data::StudentStore};
use std::ops::Deref;

#[derive(Clone, Debug)]
pub struct StudentsState<S> {
    store: S,
    label_numeric_years: bool,
}

impl<S: StudentStore> StudentsState<S> {
    pub fn new(store: S, config: &RuntimeConfiguration) -> Self {
        Self::with_year_labels(store, config.label_numeric_years())
    }

    pub const fn with_year_labels(store: S, label_numeric_years: bool) -> Self {
        Self {
            store,
            label_numeric_years,
        }
    }

    pub const fn label_numeric_years(&self) -> bool {
        self.label_numeric_years
    }
}

impl<S> Deref for StudentsState<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
