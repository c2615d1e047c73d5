/// Three-state update for a clearable field in a partial patch.
///
/// - `NoChange`: the field is left out of the outbound request entirely
/// - `Set(value)`: the field is sent with the new value
/// - `Clear`: the field is sent with its empty representation
///
/// # Example
///
/// ```
/// use kanban_domain::FieldUpdate;
///
/// let mut column = Some(3_i64);
/// FieldUpdate::Set(7).apply_to(&mut column);
/// assert_eq!(column, Some(7));
///
/// FieldUpdate::<i64>::Clear.apply_to(&mut column);
/// assert_eq!(column, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }

    /// `None` for `NoChange`, otherwise the target value (`Some(None)` when clearing).
    pub fn as_change(&self) -> Option<Option<&T>> {
        match self {
            FieldUpdate::NoChange => None,
            FieldUpdate::Set(value) => Some(Some(value)),
            FieldUpdate::Clear => Some(None),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some(value)` sets, `None` clears.
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}
