/// Window title showing render progress, e.g. `"pathview | 42 Iterations"`.
pub fn format_title(base: &str, iteration: u32) -> String {
    format!("{base} | {iteration} Iterations")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_iteration_count() {
        assert_eq!(format_title("Path Tracer", 0), "Path Tracer | 0 Iterations");
        assert_eq!(format_title("Path Tracer", 1024), "Path Tracer | 1024 Iterations");
    }
}
