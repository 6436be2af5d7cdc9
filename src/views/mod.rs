//! View rendering module
//!
//! Server-rendered HTML pages for the person resource. Each function
//! takes the data it renders and returns complete markup; handlers wrap
//! the result in an HTTP response. All user data passes through
//! `escape_html` on the way into a page.

use crate::store::{Gender, Person, PersonInput};

/// Wrap page content in the shared HTML shell.
fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            max-width: 720px;
            margin: 0 auto;
            padding: 20px;
            background: #f5f5f5;
            color: #333;
        }}
        h1 {{
            color: #667eea;
            border-bottom: 2px solid #667eea;
            padding-bottom: 5px;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            margin: 20px 0;
            background: white;
        }}
        th, td {{
            border: 1px solid #ddd;
            padding: 10px;
            text-align: left;
        }}
        th {{
            background: #667eea;
            color: white;
        }}
        a {{
            color: #667eea;
            text-decoration: none;
        }}
        a:hover {{
            text-decoration: underline;
        }}
        form.record {{
            background: white;
            padding: 20px;
            border: 1px solid #ddd;
            max-width: 420px;
        }}
        form.record label {{
            display: block;
            margin: 10px 0 4px;
            font-weight: bold;
        }}
        form.record input, form.record select {{
            width: 100%;
            padding: 6px;
            box-sizing: border-box;
        }}
        form.record button {{
            margin-top: 15px;
            padding: 8px 16px;
            background: #667eea;
            color: white;
            border: none;
            cursor: pointer;
        }}
        .error {{
            background: #fde8e8;
            border: 1px solid #c0392b;
            color: #c0392b;
            padding: 10px;
            margin-bottom: 15px;
        }}
    </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

/// Escape HTML-significant characters in user data.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// The list page: one table row per person with show/edit/delete links.
pub fn person_list(people: &[Person]) -> String {
    let rows = if people.is_empty() {
        r#"        <tr><td colspan="5">No people yet.</td></tr>"#.to_string()
    } else {
        people
            .iter()
            .map(|p| {
                let id = escape_html(&p.id);
                format!(
                    "        <tr><td><a href=\"/person/{id}\">{name}</a></td><td>{age}</td><td>{gender}</td><td>{mobile}</td><td><a href=\"/person/{id}/edit\">Edit</a> <a href=\"/person/{id}/delete\">Delete</a></td></tr>",
                    name = escape_html(&p.name),
                    age = p.age,
                    gender = p.gender,
                    mobile = escape_html(&p.mobile),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        r#"    <h1>People</h1>
    <p><a href="/person/new">Add a person</a></p>
    <table>
        <tr><th>Name</th><th>Age</th><th>Gender</th><th>Mobile</th><th>Actions</th></tr>
{rows}
    </table>"#
    );
    layout("People", &body)
}

/// The creation form. Re-rendered with the submitted values and an
/// error banner when validation fails.
pub fn person_new_form(values: &PersonInput, error: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>New Person</h1>
{error}    <form class="record" method="post" action="/person">
{fields}
        <button type="submit">Create</button>
    </form>
    <p><a href="/person">Back to list</a></p>"#,
        error = error_banner(error),
        fields = form_fields(values),
    );
    layout("New Person", &body)
}

/// The edit form, pre-filled with the record's current values. The
/// update is tunneled over POST with a `_method` override.
pub fn person_edit_form(id: &str, values: &PersonInput, error: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>Edit Person</h1>
{error}    <form class="record" method="post" action="/person/{id}?_method=PUT">
{fields}
        <button type="submit">Update</button>
    </form>
    <p><a href="/person">Back to list</a></p>"#,
        error = error_banner(error),
        id = escape_html(id),
        fields = form_fields(values),
    );
    layout("Edit Person", &body)
}

/// The detail page for one record.
pub fn person_show(person: &Person) -> String {
    let id = escape_html(&person.id);
    let body = format!(
        r#"    <h1>{name}</h1>
    <table>
        <tr><th>Name</th><td>{name}</td></tr>
        <tr><th>Age</th><td>{age}</td></tr>
        <tr><th>Gender</th><td>{gender}</td></tr>
        <tr><th>Mobile</th><td>{mobile}</td></tr>
    </table>
    <p><a href="/person/{id}/edit">Edit</a> <a href="/person/{id}/delete">Delete</a> <a href="/person">Back to list</a></p>"#,
        name = escape_html(&person.name),
        age = person.age,
        gender = person.gender,
        mobile = escape_html(&person.mobile),
    );
    layout("Person", &body)
}

/// The delete-confirmation page. The delete is tunneled over POST with
/// a `_method` override.
pub fn person_delete_confirm(person: &Person) -> String {
    let id = escape_html(&person.id);
    let body = format!(
        r#"    <h1>Delete Person</h1>
    <p>Really delete <strong>{name}</strong> ({age}, {gender}, {mobile})?</p>
    <form class="record" method="post" action="/person/{id}?_method=DELETE">
        <button type="submit">Delete</button>
    </form>
    <p><a href="/person">Cancel</a></p>"#,
        name = escape_html(&person.name),
        age = person.age,
        gender = person.gender,
        mobile = escape_html(&person.mobile),
    );
    layout("Delete Person", &body)
}

fn error_banner(error: Option<&str>) -> String {
    error.map_or_else(String::new, |msg| {
        format!("    <p class=\"error\">{}</p>\n", escape_html(msg))
    })
}

/// Shared field markup for the create and edit forms.
fn form_fields(values: &PersonInput) -> String {
    let gender_options = Gender::ALL
        .iter()
        .map(|g| {
            let selected = if values.gender.as_deref() == Some(g.as_str()) {
                " selected"
            } else {
                ""
            };
            format!("            <option value=\"{g}\"{selected}>{g}</option>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"        <label for="name">Name</label>
        <input type="text" id="name" name="name" value="{name}" required>
        <label for="age">Age</label>
        <input type="number" id="age" name="age" min="0" value="{age}" required>
        <label for="gender">Gender</label>
        <select id="gender" name="gender" required>
            <option value="">-- select --</option>
{gender_options}
        </select>
        <label for="mobile">Mobile</label>
        <input type="text" id="mobile" name="mobile" value="{mobile}" required>"#,
        name = escape_html(values.name.as_deref().unwrap_or("")),
        age = escape_html(values.age.as_deref().unwrap_or("")),
        mobile = escape_html(values.mobile.as_deref().unwrap_or("")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_person() -> Person {
        Person {
            id: "7a1f3c9e-0000-4000-8000-000000000001".to_string(),
            name: "Ana".to_string(),
            age: 30,
            gender: Gender::Female,
            mobile: "555-0100".to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_list_renders_rows_and_links() {
        let person = sample_person();
        let html = person_list(std::slice::from_ref(&person));
        assert!(html.contains("Ana"));
        assert!(html.contains(&format!("/person/{}", person.id)));
        assert!(html.contains(&format!("/person/{}/edit", person.id)));
        assert!(html.contains(&format!("/person/{}/delete", person.id)));
    }

    #[test]
    fn test_list_empty_state() {
        let html = person_list(&[]);
        assert!(html.contains("No people yet."));
    }

    #[test]
    fn test_new_form_shows_error_and_keeps_values() {
        let values = PersonInput {
            name: Some("Ana".to_string()),
            age: Some("-1".to_string()),
            gender: Some("Female".to_string()),
            mobile: None,
        };
        let html = person_new_form(&values, Some("age must be 0 or greater"));
        assert!(html.contains("age must be 0 or greater"));
        assert!(html.contains(r#"value="Ana""#));
        assert!(html.contains(r#"value="-1""#));
        assert!(html.contains(r#"<option value="Female" selected>"#));
        assert!(html.contains(r#"action="/person""#));
    }

    #[test]
    fn test_edit_form_tunnels_put() {
        let person = sample_person();
        let html = person_edit_form(&person.id, &PersonInput::from(&person), None);
        assert!(html.contains(&format!("action=\"/person/{}?_method=PUT\"", person.id)));
        assert!(html.contains(r#"value="Ana""#));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_delete_confirm_tunnels_delete() {
        let person = sample_person();
        let html = person_delete_confirm(&person);
        assert!(html.contains(&format!(
            "action=\"/person/{}?_method=DELETE\"",
            person.id
        )));
        assert!(html.contains("Really delete"));
    }

    #[test]
    fn test_show_escapes_user_data() {
        let mut person = sample_person();
        person.name = "<script>alert(1)</script>".to_string();
        let html = person_show(&person);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
