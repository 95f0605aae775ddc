//! Text progress bar for preload reports.

const BAR_WIDTH: usize = 20;

/// Renders `[████░░░░] 40% (4/10)` for `loaded` of `total` cells.
pub fn render(loaded: u64, total: u64) -> String {
    let fraction = if total == 0 {
        1.0
    } else {
        (loaded.min(total) as f64) / (total as f64)
    };
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let percent = (fraction * 100.0).floor() as u32;

    format!(
        "[{}{}] {:>3}% ({}/{})",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        percent,
        loaded,
        total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bar() {
        assert_eq!(render(0, 9), format!("[{}]   0% (0/9)", "░".repeat(20)));
    }

    #[test]
    fn test_full_bar() {
        assert_eq!(render(9, 9), format!("[{}] 100% (9/9)", "█".repeat(20)));
    }

    #[test]
    fn test_half_bar() {
        let bar = render(5, 10);
        assert!(bar.starts_with(&format!("[{}{}]", "█".repeat(10), "░".repeat(10))));
        assert!(bar.ends_with(" 50% (5/10)"));
    }

    #[test]
    fn test_zero_total_is_complete() {
        assert!(render(0, 0).contains("100%"));
    }
}
