mod cleanvoice_client;

pub use cleanvoice_client::CleanVoiceClient;
