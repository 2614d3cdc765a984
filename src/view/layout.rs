//! Page shell (head, navigation bar, main area)

use super::utils::escape_html;
use crate::auth::LoggedIn;

const STYLE: &str = "body{font-family:sans-serif;margin:0}\
nav{background:#1db954;padding:.6em 1em}\
nav a,nav button{color:#fff;margin-right:1em;background:none;border:0;font:inherit;cursor:pointer}\
main{padding:1em 2em}\
form label{display:block;margin:.5em 0}\
.artist{display:inline-block;width:200px;margin:1em;text-align:center}\
.artist img{width:180px;height:180px;object-fit:cover}";

// Forms cannot send DELETE, so logging out goes through fetch.
const LOG_OUT_SCRIPT: &str = r#"<script>
const logOut = document.getElementById("log-out");
if (logOut) {
  logOut.addEventListener("click", async () => {
    await fetch("/sessions/" + logOut.dataset.session, { method: "DELETE" });
    window.location = "/";
  });
}
</script>"#;

pub fn render_page(title: &str, current: Option<&LoggedIn>, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title} - hallon</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{nav}\n<main>\n{body}\n</main>\n{LOG_OUT_SCRIPT}\n</body>\n</html>\n",
        title = escape_html(title),
        nav = render_nav(current),
    )
}

fn render_nav(current: Option<&LoggedIn>) -> String {
    let account = match current {
        Some(current) => format!(
            "<span>{}</span> <button id=\"log-out\" data-session=\"{}\">Log out</button>",
            escape_html(&current.user.name),
            current.session_id
        ),
        None => "<a href=\"/sessions/new\">Log in</a><a href=\"/users/new\">Sign up</a>".to_string(),
    };
    format!("<nav><a href=\"/\">Home</a><a href=\"/search\">Search</a>{}</nav>", account)
}
