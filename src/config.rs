/// Marker vocabulary recognized by the [`Scanner`](crate::Scanner)
///
/// The defaults match dumps of MTProto `upload.getFile` exchanges, where each processed
/// capture file is labelled `<n>_sent_data.bin` or `<n>_received_data.bin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Type name that opens a request block
    pub request_type: String,
    /// Type name of the nested structure carrying the resource id
    pub location_type: String,
    /// Type name that opens a result envelope
    pub envelope_type: String,
    /// Type name that opens a response block inside an envelope
    pub response_type: String,
    /// Label tag of outbound capture units, also used for sequence numbers
    pub outbound_tag: String,
    /// Label tag of inbound capture units, also used for sequence numbers
    pub inbound_tag: String,
}

impl ScannerConfig {
    pub fn with_request_type<S: Into<String>>(mut self, s: S) -> Self {
        self.request_type = s.into();
        self
    }

    pub fn with_location_type<S: Into<String>>(mut self, s: S) -> Self {
        self.location_type = s.into();
        self
    }

    pub fn with_envelope_type<S: Into<String>>(mut self, s: S) -> Self {
        self.envelope_type = s.into();
        self
    }

    pub fn with_response_type<S: Into<String>>(mut self, s: S) -> Self {
        self.response_type = s.into();
        self
    }

    pub fn with_outbound_tag<S: Into<String>>(mut self, s: S) -> Self {
        self.outbound_tag = s.into();
        self
    }

    pub fn with_inbound_tag<S: Into<String>>(mut self, s: S) -> Self {
        self.inbound_tag = s.into();
        self
    }

    /// Returns true if `label` names an outbound capture unit
    #[inline]
    pub fn is_outbound(&self, label: &str) -> bool {
        label.contains(self.outbound_tag.as_str())
    }

    /// Returns true if `label` names an inbound capture unit
    #[inline]
    pub fn is_inbound(&self, label: &str) -> bool {
        label.contains(self.inbound_tag.as_str())
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            request_type: "TLUploadGetFile".to_owned(),
            location_type: "InputFileLocation".to_owned(),
            envelope_type: "TLRpcResult".to_owned(),
            response_type: "TLUploadFile".to_owned(),
            outbound_tag: "_sent_data.bin".to_owned(),
            inbound_tag: "_received_data.bin".to_owned(),
        }
    }
}
