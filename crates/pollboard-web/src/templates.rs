use tera::Tera;

/// Build the template engine once at startup. Templates are embedded in
/// the binary so the server runs from a single executable.
pub fn engine() -> anyhow::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("polls/index.html", include_str!("../templates/polls/index.html")),
        ("polls/detail.html", include_str!("../templates/polls/detail.html")),
        ("polls/results.html", include_str!("../templates/polls/results.html")),
        (
            "admin/question_list.html",
            include_str!("../templates/admin/question_list.html"),
        ),
        (
            "admin/question_form.html",
            include_str!("../templates/admin/question_form.html"),
        ),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::engine;

    #[test]
    fn all_templates_parse() {
        let tera = engine().expect("templates must parse");
        let names: Vec<_> = tera.get_template_names().collect();
        assert!(names.contains(&"polls/index.html"));
        assert!(names.contains(&"admin/question_form.html"));
    }
}
