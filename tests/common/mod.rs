//! Test utilities for libcorenlp integration tests.
//!
//! [`FakeEngine`] writes a small `/bin/sh` program that speaks the engine's
//! console protocol: it prints warm-up markers, then the prompt, then answers
//! each input line. The reply depends on a keyword in the line:
//!
//! | keyword     | reply                                          |
//! |-------------|------------------------------------------------|
//! | `CRASH`     | partial output, then exit                      |
//! | `OOM`       | out-of-memory warning, then the prompt         |
//! | `HANG`      | nothing (sleeps)                               |
//! | `GARBAGE`   | text without an XML declaration                |
//! | `MALFORMED` | XML missing the dependency groups              |
//! | `SLOW`      | an empty document after half a second          |
//! | `TWO`       | a two-sentence document                        |
//! | otherwise   | the one-sentence "Dr. Smith" document          |

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use libcorenlp::{LaunchCommand, SessionConfig, SessionConfigBuilder, WarmupMarker};
use tempfile::TempDir;

/// One-sentence response, six tokens.
pub const SMITH_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet href="CoreNLP-to-HTML.xsl" type="text/xsl"?>
<root>
  <document>
    <sentences>
      <sentence id="1">
        <tokens>
          <token id="1"><word>Dr.</word><lemma>Dr.</lemma><CharacterOffsetBegin>0</CharacterOffsetBegin><CharacterOffsetEnd>3</CharacterOffsetEnd><POS>NNP</POS><NER>O</NER></token>
          <token id="2"><word>Smith</word><lemma>Smith</lemma><CharacterOffsetBegin>4</CharacterOffsetBegin><CharacterOffsetEnd>9</CharacterOffsetEnd><POS>NNP</POS><NER>PERSON</NER></token>
          <token id="3"><word>went</word><lemma>go</lemma><CharacterOffsetBegin>10</CharacterOffsetBegin><CharacterOffsetEnd>14</CharacterOffsetEnd><POS>VBD</POS><NER>O</NER></token>
          <token id="4"><word>to</word><lemma>to</lemma><CharacterOffsetBegin>15</CharacterOffsetBegin><CharacterOffsetEnd>17</CharacterOffsetEnd><POS>TO</POS><NER>O</NER></token>
          <token id="5"><word>Washington</word><lemma>Washington</lemma><CharacterOffsetBegin>18</CharacterOffsetBegin><CharacterOffsetEnd>28</CharacterOffsetEnd><POS>NNP</POS><NER>LOCATION</NER></token>
          <token id="6"><word>.</word><lemma>.</lemma><CharacterOffsetBegin>28</CharacterOffsetBegin><CharacterOffsetEnd>29</CharacterOffsetEnd><POS>.</POS><NER>O</NER></token>
        </tokens>
        <parse>(ROOT (S (NP (NNP Dr.) (NNP Smith)) (VP (VBD went) (PP (TO to) (NP (NNP Washington)))) (. .)))</parse>
        <dependencies type="basic-dependencies">
          <dep type="root"><governor idx="0">ROOT</governor><dependent idx="3">went</dependent></dep>
          <dep type="compound"><governor idx="2">Smith</governor><dependent idx="1">Dr.</dependent></dep>
          <dep type="nsubj"><governor idx="3">went</governor><dependent idx="2">Smith</dependent></dep>
          <dep type="case"><governor idx="5">Washington</governor><dependent idx="4">to</dependent></dep>
          <dep type="nmod"><governor idx="3">went</governor><dependent idx="5">Washington</dependent></dep>
          <dep type="punct"><governor idx="3">went</governor><dependent idx="6">.</dependent></dep>
        </dependencies>
      </sentence>
    </sentences>
  </document>
</root>"#;

/// Two sentences, 3 + 2 tokens, 2 + 1 dependency edges.
pub const TWO_SENTENCE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root><document><sentences>
  <sentence id="1">
    <tokens>
      <token id="1"><word>It</word><lemma>it</lemma><CharacterOffsetBegin>0</CharacterOffsetBegin><CharacterOffsetEnd>2</CharacterOffsetEnd><POS>PRP</POS><NER>O</NER></token>
      <token id="2"><word>rained</word><lemma>rain</lemma><CharacterOffsetBegin>3</CharacterOffsetBegin><CharacterOffsetEnd>9</CharacterOffsetEnd><POS>VBD</POS><NER>O</NER></token>
      <token id="3"><word>.</word><lemma>.</lemma><CharacterOffsetBegin>9</CharacterOffsetBegin><CharacterOffsetEnd>10</CharacterOffsetEnd><POS>.</POS><NER>O</NER></token>
    </tokens>
    <parse>(ROOT (S (NP (PRP It)) (VP (VBD rained)) (. .)))</parse>
    <dependencies type="basic-dependencies">
      <dep type="root"><governor idx="0">ROOT</governor><dependent idx="2">rained</dependent></dep>
      <dep type="nsubj"><governor idx="2">rained</governor><dependent idx="1">It</dependent></dep>
    </dependencies>
  </sentence>
  <sentence id="2">
    <tokens>
      <token id="1"><word>Stop</word><lemma>stop</lemma><CharacterOffsetBegin>11</CharacterOffsetBegin><CharacterOffsetEnd>15</CharacterOffsetEnd><POS>VB</POS><NER>O</NER></token>
      <token id="2"><word>.</word><lemma>.</lemma><CharacterOffsetBegin>15</CharacterOffsetBegin><CharacterOffsetEnd>16</CharacterOffsetEnd><POS>.</POS><NER>O</NER></token>
    </tokens>
    <parse>(ROOT (S (VP (VB Stop)) (. .)))</parse>
    <dependencies type="basic-dependencies">
      <dep type="root"><governor idx="0">ROOT</governor><dependent idx="1">Stop</dependent></dep>
    </dependencies>
  </sentence>
</sentences></document></root>"#;

const MALFORMED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root><document><sentences><sentence id="1"><tokens/><parse>(ROOT)</parse></sentence></sentences></document></root>"#;

const EMPTY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root><document><sentences></sentences></document></root>"#;

const SCRIPT: &str = r#"
echo "Adding annotator tokenize" >&2
echo "Loading POS tagger ... done." >&2
echo "Loading parser ... done." >&2
echo "Entering interactive shell." >&2
sleep 0.2
printf '\nNLP> '
while IFS= read -r line; do
  case "$line" in
    *CRASH*)
      echo "Exception in thread \"main\" java.lang.RuntimeException"
      exit 1 ;;
    *OOM*)
      printf '\nWARNING: Parsing of sentence failed, possibly because of out of memory.\n'
      printf '\nNLP> ' ;;
    *HANG*)
      exec sleep 30 ;;
    *GARBAGE*)
      printf 'Sentence #1 (1 tokens):\nno markup here'
      printf '\nNLP> ' ;;
    *MALFORMED*)
      cat malformed.xml
      printf '\nNLP> ' ;;
    *SLOW*)
      sleep 0.5
      cat empty.xml
      printf '\nNLP> ' ;;
    *TWO*)
      printf 'Sentence #1 (3 tokens):\n'
      cat two.xml
      printf '\nNLP> ' ;;
    *)
      printf 'Sentence #1 (6 tokens):\n%s\n' "$line"
      cat smith.xml
      printf '\nNLP> ' ;;
  esac
done
"#;

/// A scripted engine living in a temporary directory.
pub struct FakeEngine {
    dir: TempDir,
}

impl FakeEngine {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("engine.sh"), SCRIPT).expect("write script");
        fs::write(dir.path().join("smith.xml"), SMITH_XML).expect("write fixture");
        fs::write(dir.path().join("two.xml"), TWO_SENTENCE_XML).expect("write fixture");
        fs::write(dir.path().join("malformed.xml"), MALFORMED_XML).expect("write fixture");
        fs::write(dir.path().join("empty.xml"), EMPTY_XML).expect("write fixture");
        Self { dir }
    }

    pub fn script(&self) -> PathBuf {
        self.dir.path().join("engine.sh")
    }

    /// A builder wired to this engine with short timeouts.
    ///
    /// The per-request timeout is the 1 s floor for any short request.
    pub fn config(&self) -> SessionConfigBuilder {
        SessionConfig::builder()
            .launch(LaunchCommand::new("sh").arg(self.script().to_string_lossy()))
            .working_directory(self.dir.path())
            .warmup_markers([
                WarmupMarker::new("done.", Duration::from_secs(5)),
                WarmupMarker::new("done.", Duration::from_secs(5)),
                WarmupMarker::new("Entering interactive shell.", Duration::from_secs(5)),
            ])
            .ready_timeout(Duration::from_secs(5))
            .timeout_floor(Duration::from_secs(1))
            .chars_per_second(1000.0)
            .drain_grace(Duration::from_millis(20))
            .terminate_poll_interval(Duration::from_millis(10))
            .terminate_grace(Duration::from_millis(500))
    }

    pub fn build(&self) -> SessionConfig {
        self.config().build().expect("valid config")
    }
}
