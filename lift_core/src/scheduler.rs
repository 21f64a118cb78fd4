//! Cooperative scheduler: a fixed, ordered list of polled tasks.
//!
//! Every task runs exactly once per cycle, in the order given at construction,
//! against a shared context. Tasks must return promptly; none may block. The
//! list cannot be changed after construction.

/// A named, non-blocking unit of work run once per cycle.
pub struct Task<C> {
    name: &'static str,
    poll: fn(&mut C),
}

impl<C> Task<C> {
    pub const fn new(name: &'static str, poll: fn(&mut C)) -> Self {
        Self { name, poll }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<C> Clone for Task<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Task<C> {}

impl<C> core::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Task").field(&self.name).finish()
    }
}

pub struct Scheduler<C> {
    tasks: Vec<Task<C>>,
    cycles: u64,
}

impl<C> core::fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.tasks)
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl<C> Scheduler<C> {
    pub fn new(tasks: impl IntoIterator<Item = Task<C>>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
            cycles: 0,
        }
    }

    /// Run every task once, in order.
    pub fn run_cycle(&mut self, ctx: &mut C) {
        for task in &self.tasks {
            (task.poll)(ctx);
        }
        self.cycles = self.cycles.wrapping_add(1);
    }

    pub fn task_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tasks.iter().map(Task::name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
