//! Reproducible selection of list indices keyed by `serviceSlug:locationSlug`.

use crate::domain::model::Testimonial;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

// Numerical Recipes LCG
const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

/// 每個 (service, location) 加上地點後綴的推薦數量
pub const DEFAULT_SUFFIX_COUNT: usize = 2;

pub fn fnv1a_32(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

pub fn diversification_key(service_slug: &str, location_slug: &str) -> String {
    format!("{}:{}", service_slug, location_slug)
}

/// 從 `0..n` 中選出 `count` 個不重複的索引 (遞增排序)。
///
/// 以 FNV-1a 雜湊為種子做 LCG 隨機漫步，碰撞時線性探測；
/// 探測次數有上限，所以結果最多 `min(count, n)` 個。
pub fn select_indices(n: usize, key: &str, count: usize) -> Vec<usize> {
    let target = count.min(n);
    if target == 0 {
        return Vec::new();
    }

    let mut taken = vec![false; n];
    let mut selected = Vec::with_capacity(target);
    let mut state = fnv1a_32(key);
    let mut probe_budget = n.saturating_mul(4).max(16);

    while selected.len() < target && probe_budget > 0 {
        state = state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
        // LCG 低位元週期很短，取高位元
        let mut index = (state >> 16) as usize % n;

        while taken[index] && probe_budget > 0 {
            index = (index + 1) % n;
            probe_budget -= 1;
        }
        if taken[index] {
            break;
        }

        taken[index] = true;
        selected.push(index);
        probe_budget = probe_budget.saturating_sub(1);
    }

    selected.sort_unstable();
    selected
}

/// 在選中的推薦作者後面加上 " (Ciudad)"
pub fn diversify_testimonials(
    testimonials: &mut [Testimonial],
    key: &str,
    location_name: &str,
    count: usize,
) {
    let suffix = format!("({})", location_name);
    for index in select_indices(testimonials.len(), key, count) {
        let author = &mut testimonials[index].author;
        if !author.ends_with(&suffix) {
            author.push(' ');
            author.push_str(&suffix);
        }
    }
}
