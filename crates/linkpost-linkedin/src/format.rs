//! UGC post and asset registration payloads.

use serde_json::{Value, json};

const MEDIA_UPLOAD_KEY: &str = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest";

/// `urn:li:person:<id>`, leaving ids that are already URNs untouched.
pub fn author_urn(person_id: &str) -> String {
    if person_id.starts_with("urn:li:") {
        person_id.to_string()
    } else {
        format!("urn:li:person:{person_id}")
    }
}

/// A published, public UGC post. Media URNs switch the category to IMAGE.
pub fn ugc_post(author: &str, text: &str, media_urns: &[String]) -> Value {
    let mut share_content = json!({
        "shareCommentary": { "text": text },
        "shareMediaCategory": if media_urns.is_empty() { "NONE" } else { "IMAGE" },
    });

    if !media_urns.is_empty() {
        let media: Vec<Value> = media_urns
            .iter()
            .map(|urn| json!({ "status": "READY", "media": urn }))
            .collect();
        share_content["media"] = Value::Array(media);
    }

    json!({
        "author": author,
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": share_content
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}

/// Body for `assets?action=registerUpload`.
pub fn register_upload_request(owner: &str) -> Value {
    json!({
        "registerUploadRequest": {
            "recipes": ["urn:li:digitalmediaRecipe:feedshare-image"],
            "owner": owner,
            "serviceRelationships": [{
                "relationshipType": "OWNER",
                "identifier": "urn:li:userGeneratedContent"
            }]
        }
    })
}

/// Pull `(upload_url, asset_urn)` out of a registerUpload response.
pub fn parse_registered_upload(body: &Value) -> Option<(String, String)> {
    let value = body.get("value")?;
    let upload_url = value
        .get("uploadMechanism")?
        .get(MEDIA_UPLOAD_KEY)?
        .get("uploadUrl")?
        .as_str()?;
    let asset = value.get("asset")?.as_str()?;
    Some((upload_url.to_string(), asset.to_string()))
}

/// Bare share ids become `urn:li:share:<id>`; URNs pass through.
pub fn share_urn(post_id: &str) -> String {
    let id = post_id.trim();
    if id.contains(':') {
        id.to_string()
    } else {
        format!("urn:li:share:{id}")
    }
}

/// Percent-encode the separators of a URN for use as a path segment.
pub fn encode_urn(urn: &str) -> String {
    urn.replace('%', "%25")
        .replace(':', "%3A")
        .replace(',', "%2C")
        .replace('(', "%28")
        .replace(')', "%29")
}
