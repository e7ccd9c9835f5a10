use std::fmt;

use tracing::debug;

/// Steps of the syllabus wizard, in order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WizardStep {
    Course,
    Objectives,
    Geneds,
    Grading,
    Materials,
    Policies,
}

impl WizardStep {
    pub const ALL: &'static [WizardStep] = &[
        WizardStep::Course,
        WizardStep::Objectives,
        WizardStep::Geneds,
        WizardStep::Grading,
        WizardStep::Materials,
        WizardStep::Policies,
    ];

    /// 1-indexed lookup.
    pub fn from_number(step: usize) -> Option<Self> {
        step.checked_sub(1).and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|step| *step == self)
            .map_or(1, |idx| idx + 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Course => "Select Course",
            WizardStep::Objectives => "Learning Objectives",
            WizardStep::Geneds => "Gen Ed Outcomes",
            WizardStep::Grading => "Grading",
            WizardStep::Materials => "Course Materials",
            WizardStep::Policies => "Policies & Statements",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A completed move of the step cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transition {
    pub to: usize,
    pub from: usize,
}

type Listener = Box<dyn FnMut(Transition)>;

/// Cursor over `total` 1-indexed steps.
///
/// Moves past either end and out-of-range jumps are ignored. Direct jumps
/// may only go backwards; unvisited steps are reached with [`advance`].
///
/// [`advance`]: StepNavigator::advance
pub struct StepNavigator {
    total: usize,
    current: usize,
    listeners: Vec<Listener>,
}

impl StepNavigator {
    /// A navigator over `total` steps. Zero is treated as one.
    pub fn new(total: usize) -> Self {
        Self {
            total: total.max(1),
            current: 1,
            listeners: Vec::new(),
        }
    }

    /// The six-step syllabus wizard.
    pub fn wizard() -> Self {
        Self::new(WizardStep::ALL.len())
    }

    /// Resumes at `step`, clamped into range. No listener fires.
    pub fn resume_at(mut self, step: usize) -> Self {
        self.current = step.clamp(1, self.total);
        self
    }

    /// Registers a callback run after every successful transition.
    pub fn on_transition(&mut self, listener: impl FnMut(Transition) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_terminal(&self) -> bool {
        self.current == self.total
    }

    /// The terminal step exposes no "next" action.
    pub fn has_next(&self) -> bool {
        !self.is_terminal()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn advance(&mut self) -> Option<Transition> {
        if !self.has_next() {
            return None;
        }
        self.move_to(self.current + 1)
    }

    pub fn retreat(&mut self) -> Option<Transition> {
        if !self.has_previous() {
            return None;
        }
        self.move_to(self.current - 1)
    }

    pub fn go_to(&mut self, step: usize) -> Option<Transition> {
        if step < 1 || step > self.total {
            debug!(step, total = self.total, "ignoring out-of-range step");
            return None;
        }
        if step >= self.current {
            debug!(step, current = self.current, "ignoring forward jump");
            return None;
        }
        self.move_to(step)
    }

    fn move_to(&mut self, step: usize) -> Option<Transition> {
        let transition = Transition {
            to: step,
            from: self.current,
        };
        self.current = step;
        for listener in &mut self.listeners {
            listener(transition);
        }
        Some(transition)
    }
}

impl fmt::Debug for StepNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepNavigator")
            .field("total", &self.total)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
