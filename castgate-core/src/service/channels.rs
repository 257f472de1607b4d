use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::{
    models::{Channel, OwnerId},
    repository::ChannelStore,
    Error, Result,
};

/// RFC 3986 path-segment escaping set
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

const MAX_NAME_LEN: usize = 64;

/// Owner-facing view of a channel, decorated with the publish URL parts the
/// owner pastes into their encoder.
#[derive(Clone, Serialize)]
pub struct ChannelDef {
    pub name: String,
    pub key: String,
    pub announce: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftl_id: Option<String>,
    pub rtmp_dir: String,
    pub rtmp_base: String,
}

impl ChannelDef {
    fn from_channel(channel: Channel, rtmp_dir: &str) -> Self {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("key", &channel.secret)
            .finish();
        let target = format!(
            "{}?{}",
            utf8_percent_encode(&channel.name, PATH_SEGMENT),
            query
        );
        Self {
            name: channel.name,
            key: channel.secret,
            announce: channel.announce,
            ftl_id: channel.ftl_id,
            rtmp_dir: rtmp_dir.to_string(),
            rtmp_base: target,
        }
    }
}

/// Owner-facing channel management over the registry
pub struct ChannelService {
    store: Arc<dyn ChannelStore>,
    rtmp_base: String,
}

impl ChannelService {
    #[must_use]
    pub fn new(store: Arc<dyn ChannelStore>, rtmp_base: String) -> Self {
        Self { store, rtmp_base }
    }

    pub async fn list(&self, owner_id: &OwnerId) -> Result<Vec<ChannelDef>> {
        let channels = self.store.channels_by_owner(owner_id).await?;
        Ok(channels
            .into_iter()
            .map(|c| ChannelDef::from_channel(c, &self.rtmp_base))
            .collect())
    }

    /// Create a channel with a server-generated secret. The name is the
    /// public routing key and cannot be renamed later.
    pub async fn create(&self, owner_id: &OwnerId, name: &str) -> Result<ChannelDef> {
        validate_name(name)?;
        let channel = self.store.create_channel(owner_id, name).await?;
        Ok(ChannelDef::from_channel(channel, &self.rtmp_base))
    }

    pub async fn set_announce(&self, owner_id: &OwnerId, name: &str, announce: bool) -> Result<()> {
        self.store.set_announce(owner_id, name, announce).await
    }

    pub async fn delete(&self, owner_id: &OwnerId, name: &str) -> Result<()> {
        self.store.delete_channel(owner_id, name).await
    }

    /// Owner-level global announce opt-in; ANDed with each channel's own flag
    pub async fn set_owner_announce(&self, owner_id: &OwnerId, announce: bool) -> Result<()> {
        self.store.set_owner_announce(owner_id, announce).await
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidInput(format!(
            "channel name must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidInput(
            "channel name may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}
