//! First-success driver for attribute fallback chains.
//!
//! Every hardware attribute is resolved by an ordered list of probes; the
//! first probe that yields a value wins and the rest never run. Probe
//! failure is a `None`, not an error.

/// Run `probes` in order, returning the first `Some`.
pub fn first_hit<T>(probes: &[&dyn Fn() -> Option<T>]) -> Option<T> {
    probes.iter().find_map(|probe| probe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn returns_first_success_in_order() {
        let a = || None::<String>;
        let b = || Some("from-b".to_string());
        let c = || Some("from-c".to_string());
        assert_eq!(first_hit(&[&a, &b, &c]).as_deref(), Some("from-b"));
    }

    #[test]
    fn later_probes_do_not_run_after_a_hit() {
        let ran_late = Cell::new(false);
        let hit = || Some(1u32);
        let late = || {
            ran_late.set(true);
            Some(2u32)
        };
        assert_eq!(first_hit(&[&hit, &late]), Some(1));
        assert!(!ran_late.get());
    }

    #[test]
    fn all_misses_yield_none() {
        let a = || None::<u32>;
        let b = || None::<u32>;
        assert_eq!(first_hit(&[&a, &b]), None);
        assert_eq!(first_hit::<u32>(&[]), None);
    }
}
