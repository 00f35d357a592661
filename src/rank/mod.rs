use crate::model::{AwardTable, FindingRecord, RiskGroupedFindings};

/// Orders every risk category by the author's leaderboard award, highest first.
///
/// The sort is stable: findings whose authors have equal awards (including
/// authors missing from the leaderboard) keep their collection order.
pub fn assemble(mut grouped: RiskGroupedFindings, awards: &AwardTable) -> RiskGroupedFindings {
    for (_, records) in grouped.groups_mut() {
        sort_by_award(records, awards);
    }
    grouped
}

fn sort_by_award(records: &mut [FindingRecord], awards: &AwardTable) {
    records.sort_by(|lhs, rhs| {
        awards
            .award(&rhs.handle)
            .total_cmp(&awards.award(&lhs.handle))
    });
}
