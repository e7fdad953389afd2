//! Manual rotation guides for providers without a rotation API

/// Step-by-step instructions for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualGuide {
    pub service: &'static str,
    pub url: &'static str,
    pub steps: &'static [&'static str],
    pub test_command: &'static str,
    pub rotation_frequency: &'static str,
}

pub const GUIDES: &[ManualGuide] = &[
    ManualGuide {
        service: "Perplexity Pro",
        url: "https://www.perplexity.ai/settings/api",
        steps: &[
            "Go to Perplexity API settings: https://www.perplexity.ai/settings/api",
            "Click 'Create API Key'",
            "Name it: 'MCP Server - [DATE]'",
            "Copy the new key",
            "Update 1Password: op item edit 'Perplexity Pro API' credential='NEW_KEY'",
            "Test with: op read 'op://API_Keys/Perplexity Pro API/credential'",
            "Restart any services using the key",
            "Delete the old key in Perplexity settings",
        ],
        test_command: "curl -H 'Authorization: Bearer YOUR_KEY' https://api.perplexity.ai/chat/completions",
        rotation_frequency: "Every 90 days",
    },
    ManualGuide {
        service: "Gamma API",
        url: "https://gamma.app/settings/api",
        steps: &[
            "Go to Gamma API settings: https://gamma.app/settings/api",
            "Generate new API key",
            "Copy the new key",
            "Update 1Password: op item edit 'Gamma API' credential='NEW_KEY'",
            "Run the reports project that uses Gamma and confirm it works",
            "Revoke old key in Gamma settings",
        ],
        test_command: "Run your Gamma integration and verify it works",
        rotation_frequency: "Every 90 days",
    },
    ManualGuide {
        service: "Airtable",
        url: "https://airtable.com/create/tokens",
        steps: &[
            "Go to: https://airtable.com/create/tokens",
            "Click 'Create new token'",
            "Name: 'API Token - [DATE]'",
            "Scopes: data.records:read, data.records:write, schema.bases:read",
            "Access: select the bases the token needs",
            "Copy the token",
            "Update 1Password: op item edit 'Airtable WalterSignal' api_key='NEW_TOKEN'",
            "Test the token against https://api.airtable.com/v0/meta/bases",
            "Revoke the old token: https://airtable.com/account",
        ],
        test_command: "curl -H 'Authorization: Bearer YOUR_TOKEN' https://api.airtable.com/v0/meta/bases",
        rotation_frequency: "Every 90 days",
    },
    ManualGuide {
        service: "Google OAuth",
        url: "https://console.cloud.google.com",
        steps: &[
            "Go to Google Cloud Console: https://console.cloud.google.com",
            "Select the project that owns the OAuth client",
            "Navigate to APIs & Services > Credentials",
            "Click on your OAuth 2.0 Client ID",
            "Regenerate client secret",
            "Update 1Password: op item edit 'Google OAuth - Gmail MCP Server' client_secret='NEW_SECRET'",
            "Regenerate any credentials.json files derived from the client",
            "Re-authenticate any applications using these credentials",
        ],
        test_command: "Run your Gmail MCP server and test authentication",
        rotation_frequency: "Every 180 days (Google recommends annually)",
    },
    ManualGuide {
        service: "TMDB API",
        url: "https://www.themoviedb.org/settings/api",
        steps: &[
            "Go to TMDB API settings: https://www.themoviedb.org/settings/api",
            "Regenerate API key (if option available)",
            "Update 1Password: op item edit 'TMDB API - Alfred Workflow' api_key='NEW_KEY'",
            "Update Alfred workflow configuration if needed",
            "Test Alfred workflow",
        ],
        test_command: "Use Alfred to search for a movie",
        rotation_frequency: "Every 180 days",
    },
];

/// Find the guide for a service.
///
/// Matching is case-insensitive and tolerates short or suffixed names:
/// `"Perplexity"` finds "Perplexity Pro" and `"Google OAuth - MCP"` finds
/// "Google OAuth".
pub fn manual_guide(service: &str) -> Option<&'static ManualGuide> {
    let wanted = service.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    GUIDES
        .iter()
        .find(|g| g.service.to_lowercase() == wanted)
        .or_else(|| {
            GUIDES.iter().find(|g| {
                let name = g.service.to_lowercase();
                name.starts_with(&wanted) || wanted.starts_with(&name)
            })
        })
}

/// Markdown checklist for rotating `service` by hand.
pub fn render_checklist(service: &str) -> String {
    let mut out = format!("# {service} - API Key Rotation Checklist\n\n");

    match manual_guide(service) {
        Some(guide) => {
            out.push_str(&format!("**Frequency**: {}\n", guide.rotation_frequency));
            out.push_str(&format!("**Settings URL**: {}\n\n## Steps\n\n", guide.url));
            for (i, step) in guide.steps.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, step));
            }
            out.push_str(&format!("\n## Testing\n\n{}\n", guide.test_command));
        }
        None => {
            out.push_str(&format!(
                "No provider-specific guide is available for {service}.\n\n## Steps\n\n"
            ));
            let generic = [
                "Sign in to the provider's dashboard and open its API or token settings",
                "Create a new credential with the same scopes as the current one",
                "Store it in 1Password under the item tracked for this service",
                "Update every application that reads the credential",
                "Confirm the applications work with the new credential",
                "Revoke the old credential in the provider's dashboard",
            ];
            for (i, step) in generic.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, step));
            }
        }
    }

    out.push_str(
        "\n## Verification\n\n\
         - [ ] New key added to 1Password\n\
         - [ ] Old key revoked in service settings\n\
         - [ ] All applications using the key have been updated\n\
         - [ ] Test command executed successfully\n\
         - [ ] Documented rotation in audit log\n",
    );
    out.push_str(&format!(
        "\n## Record the rotation\n\n```bash\ntoolshed rotation record \"{service}\"\n```\n"
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Perplexity Pro", "Perplexity Pro")]
    #[case("perplexity", "Perplexity Pro")]
    #[case("Gamma", "Gamma API")]
    #[case("Google OAuth - MCP", "Google OAuth")]
    #[case("Google OAuth - Parser", "Google OAuth")]
    #[case("TMDB API", "TMDB API")]
    #[case("Airtable", "Airtable")]
    fn guide_lookup(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(manual_guide(query).unwrap().service, expected);
    }

    #[rstest]
    #[case("")]
    #[case("Cloudflare")]
    #[case("Notion")]
    fn no_guide(#[case] query: &str) {
        assert!(manual_guide(query).is_none());
    }

    #[test]
    fn checklist_numbers_steps_and_names_record_command() {
        let text = render_checklist("TMDB API");
        assert!(text.starts_with("# TMDB API - API Key Rotation Checklist"));
        assert!(text.contains("**Frequency**: Every 180 days"));
        assert!(text.contains("1. Go to TMDB API settings"));
        assert!(text.contains("5. Test Alfred workflow"));
        assert!(text.contains("toolshed rotation record \"TMDB API\""));
    }

    #[test]
    fn unknown_service_gets_generic_checklist() {
        let text = render_checklist("Notion");
        assert!(text.contains("No provider-specific guide"));
        assert!(text.contains("## Verification"));
    }
}
