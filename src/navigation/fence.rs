use crate::models::DetectionRole;

/// Monotonic request-generation counter.
///
/// Every outgoing request takes a fresh generation; a response is applied only
/// if its generation is still the latest one issued on that channel. Any write
/// that supersedes in-flight requests just bumps the counter.
#[derive(Debug, Clone, Default)]
pub struct Fence {
    issued: u64,
}

impl Fence {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn current(&self) -> u64 {
        self.issued
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation != 0 && generation == self.issued
    }

    pub fn invalidate(&mut self) {
        self.issued += 1;
    }
}

/// One fence per asynchronous channel that can mutate the session.
#[derive(Debug, Clone, Default)]
pub struct Fences {
    pub location: Fence,
    pub destination: Fence,
    pub arrival: Fence,
    pub route: Fence,
}

impl Fences {
    pub fn for_role(&self, role: DetectionRole) -> &Fence {
        match role {
            DetectionRole::Locate => &self.location,
            DetectionRole::Destination => &self.destination,
        }
    }

    pub fn for_role_mut(&mut self, role: DetectionRole) -> &mut Fence {
        match role {
            DetectionRole::Locate => &mut self.location,
            DetectionRole::Destination => &mut self.destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_older_generation_is_stale() {
        let mut fence = Fence::default();
        let first = fence.issue();
        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));

        fence.invalidate();
        assert!(!fence.is_current(second));
        assert!(!fence.is_current(fence.current()));
        let next = fence.issue();
        assert!(fence.is_current(next));
    }

    #[test]
    fn test_zero_is_never_current() {
        let fence = Fence::default();
        assert!(!fence.is_current(0));
    }
}
