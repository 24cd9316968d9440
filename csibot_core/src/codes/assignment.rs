//! Flags used by assignment calls: which objects a call applies to and what
//! kind of distributed load is being assigned.

host_codes! {
    /// Scope of an assignment (`eItemType`)
    #[derive(Default)]
    pub enum ItemType : "item type" {
        /// The named object only
        #[default]
        Objects = 0 => "Objects",
        /// Every object in the named group
        Group = 1 => "Group",
        /// Every selected object; the name is ignored
        SelectedObjects = 2 => "SelectedObjects",
    }
}

host_codes! {
    /// Distributed load kind (`MyType` of `SetLoadDistributed`)
    #[derive(Default)]
    pub enum DistributedLoadType : "distributed load type" {
        /// Force per unit length
        #[default]
        Force = 1 => "Force",
        /// Moment per unit length
        Moment = 2 => "Moment",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{Direction, HostCode, UnitSystem};

    #[test]
    fn test_defaults() {
        assert_eq!(ItemType::default().code(), 0);
        assert_eq!(DistributedLoadType::default().code(), 1);
        assert_eq!(Direction::default(), Direction::Gravity);
        assert_eq!(UnitSystem::default(), UnitSystem::TonfMC);
    }
}
