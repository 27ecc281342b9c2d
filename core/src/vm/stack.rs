use core::fmt;

use super::ExecutionError;

/// Operand stack with a hard depth limit.
///
/// Unlike a plain `Vec`, every push checks the configured maximum and every
/// pop reports underflow as an [`ExecutionError`], so malformed bytecode
/// surfaces as a fault instead of a panic.
///
/// # Examples
///
/// ```ignore
/// use pila_core::vm::Stack;
///
/// let mut stack = Stack::new(100);
/// stack.push(42)?;
/// stack.push(17)?;
/// assert_eq!(stack.pop()?, 17);
/// assert_eq!(stack.peek(), Some(&42));
/// assert_eq!(stack.len(), 1);
/// ```
pub struct Stack<T> {
    /// The underlying storage for stack elements.
    items: Vec<T>,
    /// Maximum allowed stack depth.
    max_size: usize,
}

impl<T> Stack<T> {
    /// Creates an empty stack that refuses to grow beyond `max_size`.
    ///
    /// Pre-allocates at most 256 slots so tiny limits stay cheap and large
    /// ones don't reserve memory that is never touched.
    pub fn new(max_size: usize) -> Self {
        let initial_capacity = max_size.min(256);

        Self {
            items: Vec::with_capacity(initial_capacity),
            max_size,
        }
    }

    /// Pushes a value onto the stack.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::StackOverflow`] if the stack is already at its
    /// maximum depth. The value is dropped in that case.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), ExecutionError> {
        if self.items.len() >= self.max_size {
            return Err(ExecutionError::StackOverflow { max: self.max_size });
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top value.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::StackUnderflow`] if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<T, ExecutionError> {
        self.items.pop().ok_or(ExecutionError::StackUnderflow)
    }

    /// Removes the top `n` values and returns them bottom-first, i.e. in the
    /// order they were pushed.
    ///
    /// ```ignore
    /// // stack: [1, 2, 3]
    /// assert_eq!(stack.pop_n(2)?, vec![2, 3]);
    /// // stack: [1]
    /// ```
    ///
    /// # Errors
    ///
    /// [`ExecutionError::StackUnderflow`] if fewer than `n` values are
    /// present. The stack is left untouched in that case.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<T>, ExecutionError> {
        if n > self.items.len() {
            return Err(ExecutionError::StackUnderflow);
        }
        let start = self.items.len() - n;
        Ok(self.items.split_off(start))
    }

    /// Returns a reference to the top value without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the maximum depth of the stack.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Iterates from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("max_size", &self.max_size)
            .finish()
    }
}
