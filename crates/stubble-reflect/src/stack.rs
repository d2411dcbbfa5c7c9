use stubble_types::Thrown;

/// Drop frames whose class name starts with one of `internal_prefixes`.
///
/// Returns a new object with the filtered trace; `thrown` keeps its own frames if it is shared.
pub fn filter_stack_trace(thrown: Thrown, internal_prefixes: &[String]) -> Thrown {
    let frames = thrown
        .stack()
        .iter()
        .filter(|frame| {
            !internal_prefixes
                .iter()
                .any(|prefix| frame.class_name.starts_with(prefix.as_str()))
        })
        .cloned()
        .collect();
    thrown.with_stack(frames)
}
