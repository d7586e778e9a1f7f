//! System instruction and the static app directory

/// An application the assistant can open by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppEntry {
    pub name: &'static str,
    pub url: &'static str,
    /// Must be offered in `suggestions` whenever the user mentions it
    pub featured: bool,
}

/// Known application names and where they live
pub const APP_DIRECTORY: &[AppEntry] = &[
    AppEntry { name: "Thinkare", url: "https://thinkare.vercel.app", featured: true },
    AppEntry { name: "Hurryup", url: "https://hurryup-buddy.vercel.app", featured: true },
    AppEntry { name: "YouTube", url: "https://youtube.com", featured: false },
    AppEntry { name: "Google", url: "https://google.com", featured: false },
    AppEntry { name: "ChatGPT", url: "https://chatgpt.com", featured: false },
    AppEntry { name: "GitHub", url: "https://github.com", featured: false },
    AppEntry { name: "Spotify", url: "https://spotify.com", featured: false },
    AppEntry { name: "Instagram", url: "https://instagram.com", featured: false },
];

/// Instruction prepended to every utterance
pub fn system_instruction() -> String {
    let mut instruction = String::from(
        r#"You are INVIKA, a voice assistant. Your reply is read aloud.

RULES:
1. Respond with a single JSON object only. No prose around it and no markdown code fences.
2. Shape: {"type": "chat" or "open", "text": "what to say", "url": "link to open", "name": "app name", "suggestions": [{"name": "App Name", "url": "URL"}]}
3. When the user asks to open an app, use type "open" with its url and name.
4. Otherwise use type "chat" and leave out url and name.
5. Every suggestion must have both name and url.

APP DIRECTORY:
"#,
    );

    for app in APP_DIRECTORY {
        instruction.push_str(&format!("- {}: {}\n", app.name, app.url));
    }

    let featured: Vec<&str> = APP_DIRECTORY
        .iter()
        .filter(|app| app.featured)
        .map(|app| app.name)
        .collect();
    if !featured.is_empty() {
        instruction.push_str(&format!(
            "\nIf the user mentions {}, you MUST include them in the suggestions list.\n",
            featured.join(" or ")
        ));
    }

    instruction
}

/// Full prompt for one utterance
pub fn build_prompt(utterance: &str) -> String {
    format!("{}\nUser: {}", system_instruction(), utterance)
}
