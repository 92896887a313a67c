//! Structured analysis types and the XML transcoder.
//!
//! The engine answers each request with an XML document:
//!
//! ```text
//! <root><document><sentences>
//!   <sentence id="1">
//!     <tokens><token id="1"><word/><lemma/><CharacterOffsetBegin/>...</token></tokens>
//!     <parse>(ROOT ...)</parse>
//!     <dependencies type="basic-dependencies"><dep type="nsubj">...</dep></dependencies>
//!     <MachineReading><entities>
//!       <entity id="..."><span start="" end=""/></entity>
//!     </entities></MachineReading>
//!   </sentence>
//! </sentences></document></root>
//! ```
//!
//! [`transcode`] turns that into an [`AnalysisResult`].
//!
//! # Example
//!
//! ```
//! use libcorenlp::channel::extract_xml;
//! use libcorenlp::protocol::transcode;
//!
//! let raw = extract_xml(
//!     r#"<?xml version="1.0"?><root><document><sentences></sentences></document></root>"#,
//! )
//! .unwrap();
//! let result = transcode(&raw).unwrap();
//! assert!(result.sentences.is_empty());
//! ```

mod document;
mod transcode;

pub use document::{
    AnalysisResult, DepNode, DependencyEdge, DependencyGroup, Entity, MachineReading, Sentence,
    Token,
};
pub use transcode::transcode;
