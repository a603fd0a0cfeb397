use crate::lns::repair::scoring::{compare_keys, ScoreKey, SortDirection};
use crate::problem::{CustomerId, ProblemContext};

/// Starts with the best-scored customer and then repeatedly appends the
/// unplaced customer closest to any placed one (ties by id).
pub(crate) fn greedy_chain(
    keys: &[ScoreKey],
    direction: SortDirection,
    context: &ProblemContext,
) -> Vec<CustomerId> {
    let first = match keys
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| compare_keys(a, b, direction))
    {
        Some((idx, _)) => idx,
        None => return vec![],
    };

    let distance = |a: CustomerId, b: CustomerId| {
        if a <= context.customer_count() && b <= context.customer_count() {
            context.distance(a, b)
        } else {
            f64::INFINITY
        }
    };

    let mut placed = vec![false; keys.len()];
    let mut closest = vec![f64::INFINITY; keys.len()];
    let mut chain = Vec::with_capacity(keys.len());
    let mut next = Some(first);
    while let Some(idx) = next {
        placed[idx] = true;
        let customer = keys[idx].customer;
        chain.push(customer);

        next = None;
        for (other, key) in keys.iter().enumerate() {
            if placed[other] {
                continue;
            }
            closest[other] = closest[other].min(distance(customer, key.customer));
            let better = match next {
                None => true,
                Some(best) => closest[other]
                    .total_cmp(&closest[best])
                    .then(key.customer.cmp(&keys[best].customer))
                    .is_lt(),
            };
            if better {
                next = Some(other);
            }
        }
    }
    chain
}
