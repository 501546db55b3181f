/// Renders a grid as text: cells joined with `,`, rows joined with newlines.
pub(crate) fn render_rows<S>(grid: &[Vec<S>]) -> String
where
    S: AsRef<str>,
{
    grid.iter()
        .map(|row| {
            row.iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
