use fixedbitset::FixedBitSet;

use crate::problem::{CustomerId, DEPOT};

/// Customers picked by a destroy operator, in the order they were picked.
#[derive(Clone, Debug)]
pub struct RemovalSet {
    customers: Vec<CustomerId>,
    members: FixedBitSet,
    target: usize,
}

impl RemovalSet {
    pub fn new(customer_count: usize, target: usize) -> Self {
        Self {
            customers: Vec::with_capacity(target),
            members: FixedBitSet::with_capacity(customer_count + 1),
            target,
        }
    }

    /// Returns `false` if the customer was already present, is the depot or
    /// is out of range.
    pub fn insert(&mut self, customer: CustomerId) -> bool {
        if customer == DEPOT || customer >= self.members.len() || self.members.put(customer) {
            false
        } else {
            self.customers.push(customer);
            true
        }
    }

    #[inline(always)]
    pub fn contains(&self, customer: CustomerId) -> bool {
        self.members.contains(customer)
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Size the operator aimed for.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Whether the operator ran out of candidates before reaching its target.
    pub fn is_degraded(&self) -> bool {
        self.len() < self.target
    }

    pub fn iter(&self) -> impl Iterator<Item = CustomerId> + '_ {
        self.customers.iter().cloned()
    }

    pub fn as_slice(&self) -> &[CustomerId] {
        &self.customers
    }

    pub fn into_vec(self) -> Vec<CustomerId> {
        self.customers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_absorbed() {
        let mut set = RemovalSet::new(5, 3);
        assert!(set.insert(2));
        assert!(!set.insert(2));
        assert!(set.insert(5));
        assert_eq!(&[2, 5], set.as_slice());
        assert!(set.contains(5));
        assert!(!set.contains(1));
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let mut set = RemovalSet::new(3, 1);
        assert!(!set.insert(4));
        assert!(!set.insert(0));
        assert!(set.is_empty());
        assert!(!set.contains(4));
    }

    #[test]
    fn degraded_when_below_target() {
        let mut set = RemovalSet::new(5, 2);
        set.insert(1);
        assert!(set.is_degraded());
        set.insert(3);
        assert!(!set.is_degraded());
        assert_eq!(vec![1, 3], set.into_vec());
    }
}
