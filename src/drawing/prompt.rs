/// Build the image-generation prompt for a description and the brush colors used.
///
/// Colors are sorted before joining so the output only depends on which colors
/// were present.
pub fn build_prompt<'a, I>(description: &str, colors: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut colors: Vec<&str> = colors.into_iter().collect();
    colors.sort_unstable();
    colors.dedup();

    let subject = if colors.is_empty() {
        format!(
            "Create a purely visual artistic oil painting drawing that reimagines '{}' in a positive manner.",
            description
        )
    } else {
        format!(
            "Create a purely visual artistic oil painting drawing using the colors {}, \
             that reimagines '{}' in a positive manner.",
            colors.join(", "),
            description
        )
    };

    format!(
        "{} For example, transforming a gloomy cloud into a scene with a rainbow. \
         The image must focus entirely on visual elements without any text, letters, or numbers.",
        subject
    )
}
