//! Individual pages

use super::layout::render_page;
use super::utils::escape_html;
use crate::auth::LoggedIn;

const SEARCH_SCRIPT: &str = r#"<script>
const form = document.getElementById("search");
const results = document.getElementById("results");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  results.textContent = "Searching...";
  const response = await fetch("/search_results", { method: "POST", body: new URLSearchParams(new FormData(form)) });
  const data = await response.json();
  results.textContent = "";
  if (!response.ok) {
    results.textContent = data.error;
    return;
  }
  for (const artist of data.artists) {
    const card = document.createElement("div");
    card.className = "artist";
    if (artist.portrait) {
      const img = document.createElement("img");
      img.src = "https://i.scdn.co/image/" + artist.portrait.split(":").pop();
      card.appendChild(img);
    }
    const name = document.createElement("p");
    name.textContent = artist.name;
    card.appendChild(name);
    results.appendChild(card);
  }
});
</script>"#;

pub fn index_page(current: Option<&LoggedIn>) -> String {
    let body = match current {
        Some(current) => format!(
            "<h1>Welcome back, {}</h1>\n<p><a href=\"/search\">Search for an artist</a></p>",
            escape_html(&current.user.name)
        ),
        None => "<h1>hallon</h1>\n<p>Search the catalog for artists. <a href=\"/users/new\">Sign up</a> or <a href=\"/sessions/new\">log in</a>.</p>".to_string(),
    };
    render_page("Home", current, &body)
}

pub fn search_page(current: Option<&LoggedIn>) -> String {
    let body = format!(
        "<h1>Search</h1>\n<form id=\"search\">\n<input name=\"query\" placeholder=\"Artist name\" autofocus>\n<button type=\"submit\">Search</button>\n</form>\n<div id=\"results\"></div>\n{}",
        SEARCH_SCRIPT
    );
    render_page("Search", current, &body)
}

pub fn login_page() -> String {
    let body = "<h1>Log in</h1>\n<form method=\"post\" action=\"/sessions\">\n<label>Email <input type=\"email\" name=\"email\" required></label>\n<label>Password <input type=\"password\" name=\"password\" required></label>\n<button type=\"submit\">Log in</button>\n</form>";
    render_page("Log in", None, body)
}

pub fn sign_up_page() -> String {
    let body = "<h1>Sign up</h1>\n<form method=\"post\" action=\"/users\">\n<label>Name <input name=\"name\" required></label>\n<label>Email <input type=\"email\" name=\"email\" required></label>\n<label>Password <input type=\"password\" name=\"password\" required></label>\n<button type=\"submit\">Sign up</button>\n</form>";
    render_page("Sign up", None, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use uuid::Uuid;

    #[test]
    fn test_index_greets_user_escaped() {
        let current = LoggedIn {
            user: User::new("<Vinnie>", "vinnie@example.com", "pw").unwrap(),
            session_id: Uuid::new_v4(),
        };
        let page = index_page(Some(&current));
        assert!(page.contains("Welcome back, &lt;Vinnie&gt;"));
        assert!(page.contains(&format!("data-session=\"{}\"", current.session_id)));
    }

    #[test]
    fn test_index_anonymous() {
        let page = index_page(None);
        assert!(page.contains("href=\"/sessions/new\""));
        assert!(!page.contains("id=\"log-out\""));
    }
}
