//! Shared typed variables
//!
//! A [`Variable`] is a handle to one mutable cell. Cloning the handle does not
//! copy the value; every clone reads and writes the same cell. There is no
//! change notification: writers raise a bus channel themselves when readers
//! need to know.

use neon_core::{Color, Vec2};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a single value, last write wins
pub struct Variable<T> {
    cell: Rc<RefCell<T>>,
}

pub type BoolVariable = Variable<bool>;
pub type IntVariable = Variable<i32>;
pub type FloatVariable = Variable<f32>;
pub type StringVariable = Variable<String>;
pub type Vec2Variable = Variable<Vec2>;
pub type ColorVariable = Variable<Color>;

impl<T> Variable<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the current value
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    /// Modify the value in place
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.cell.borrow_mut());
    }

    /// Read through a closure without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.cell.borrow())
    }

    /// Whether two handles point at the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: Clone> Variable<T> {
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T: Default> Variable<T> {
    /// Move the value out, leaving the default behind
    pub fn take(&self) -> T {
        std::mem::take(&mut *self.cell.borrow_mut())
    }
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Default> Default for Variable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&*self.cell.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_share_writes() {
        let speed = FloatVariable::new(0.0);
        let spawner_view = speed.clone();
        let scorer_view = speed.clone();

        speed.set(4.5);
        assert_eq!(spawner_view.get(), 4.5);
        assert_eq!(scorer_view.get(), 4.5);
        assert!(spawner_view.ptr_eq(&scorer_view));
    }

    #[test]
    fn update_in_place() {
        let bonus = IntVariable::new(2);
        bonus.update(|b| *b += 3);
        assert_eq!(bonus.get(), 5);
    }

    #[test]
    fn all_value_kinds() {
        let flag = BoolVariable::new(true);
        let name = StringVariable::default();
        let range = Vec2Variable::new(Vec2::new(3.0, 4.0));
        let tint = ColorVariable::new(Color::CYAN);

        flag.set(false);
        name.set("ACE".into());
        range.update(|r| r.x = 2.5);
        tint.set(Color::MAGENTA);

        assert!(!flag.get());
        assert_eq!(name.with(|n| n.len()), 3);
        assert_eq!(range.get(), Vec2::new(2.5, 4.0));
        assert_eq!(tint.get(), Color::MAGENTA);
    }

    #[test]
    fn take_leaves_default() {
        let pending: Variable<Option<i32>> = Variable::new(Some(3));
        assert_eq!(pending.take(), Some(3));
        assert_eq!(pending.get(), None);
    }

    #[test]
    fn independent_variables_do_not_alias() {
        let a = IntVariable::new(1);
        let b = IntVariable::new(1);
        a.set(7);
        assert_eq!(b.get(), 1);
        assert!(!a.ptr_eq(&b));
    }
}
