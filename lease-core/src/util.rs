/// Shortens long SQL for error contexts and logs.
#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$crate::floor_char_boundary(&$query, 497)].trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[doc(hidden)]
pub fn floor_char_boundary(value: &str, index: usize) -> usize {
    if index >= value.len() {
        return value.len();
    }
    (0..=index)
        .rev()
        .find(|i| value.is_char_boundary(*i))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    #[test]
    fn truncate_long() {
        let short = "SELECT 1";
        assert_eq!(format!("{}", truncate_long!(short)), "SELECT 1");
        let long = format!("SELECT '{}'", "é".repeat(400));
        let truncated = format!("{}", truncate_long!(long));
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 500);
    }
}
