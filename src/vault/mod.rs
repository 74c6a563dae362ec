//! The secret vault: encrypted entries on disk, decrypted plaintext cached
//! in memory
//!
//! The vault owns two keyed collections behind one coarse lock: the entry
//! index (`Uuid` → encrypted document + backing file path) and the plaintext
//! cache. The encrypted documents are authoritative; the cache is an
//! optimization that can be dropped at any time with [`SecretVault::clear_cache`].
//!
//! The lock is never held across the password callback: on a cache miss the
//! entry's document is cloned out, the prompt and the (slow) key derivation
//! run unlocked, and the cache is repopulated afterwards. Two racing misses
//! for the same entry may both decrypt; the second insert wins harmlessly.

mod error;

pub use error::{VaultError, VaultResult};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::keystore::{KeyFile, KEYSTORE_VERSION};
use crate::secure::{clone_secret, secret_bytes, ExposeSecret, SecretBytes, SecretString};

/// One indexed entry: the encrypted document and the file backing it.
struct Entry {
    document: KeyFile,
    path: Option<PathBuf>,
}

#[derive(Default)]
struct Inner {
    keys: HashMap<Uuid, Entry>,
    cached: HashMap<Uuid, SecretBytes>,
}

/// An on-disk collection of password-encrypted secrets.
pub struct SecretVault {
    dir: PathBuf,
    inner: Mutex<Inner>,
}

impl SecretVault {
    /// Open a vault over a directory, creating it if needed and loading
    /// every readable version-2 document in it.
    pub fn open(dir: impl Into<PathBuf>) -> VaultResult<Self> {
        let dir = dir.into();
        let vault = Self {
            dir: dir.clone(),
            inner: Mutex::new(Inner::default()),
        };
        vault.load_from(&dir)?;
        Ok(vault)
    }

    /// The vault's default directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch the plaintext for an entry.
    ///
    /// A cache hit returns immediately without invoking `password`. On a
    /// miss the callback is invoked once, the entry decrypted, and the
    /// plaintext cached. Unknown identifiers and failed decryptions yield
    /// `None`.
    pub fn secret<F>(&self, id: &Uuid, password: F) -> Option<SecretBytes>
    where
        F: FnOnce() -> SecretString,
    {
        let document = {
            let inner = self.inner.lock();
            if let Some(cached) = inner.cached.get(id) {
                return Some(clone_secret(cached));
            }
            inner.keys.get(id)?.document.clone()
        };

        // Prompt and derive with the lock released.
        let password = password();
        let plain = match document.decrypt(password.expose_secret()) {
            Ok(plain) => plain,
            Err(err) => {
                warn!(%id, %err, "could not decrypt keystore entry");
                return None;
            }
        };

        self.inner.lock().cached.insert(*id, clone_secret(&plain));
        Some(plain)
    }

    /// Encrypt and store a new secret, persisting the vault to disk.
    /// Returns the fresh entry identifier.
    pub fn import_secret(&self, secret: &[u8], password: &str) -> VaultResult<Uuid> {
        let document = KeyFile::encrypt(secret, password)?;
        let id = document.uuid()?;
        {
            let mut inner = self.inner.lock();
            inner.cached.insert(id, secret_bytes(secret.to_vec()));
            inner.keys.insert(
                id,
                Entry {
                    document,
                    path: None,
                },
            );
        }
        self.save()?;
        Ok(id)
    }

    /// Remove an entry: cache, index, and backing file. Killing an unknown
    /// identifier is a no-op; file removal is best-effort.
    pub fn kill(&self, id: &Uuid) {
        let mut inner = self.inner.lock();
        inner.cached.remove(id);
        if let Some(entry) = inner.keys.remove(id) {
            if let Some(path) = entry.path {
                if let Err(err) = fs::remove_file(&path) {
                    warn!(path = %path.display(), %err, "could not remove keystore file");
                }
            }
        }
    }

    /// Drop all cached plaintext. Index and disk state are untouched; the
    /// next `secret()` call per entry will re-prompt.
    pub fn clear_cache(&self) {
        self.inner.lock().cached.clear();
    }

    /// Persist every entry to the vault's directory.
    pub fn save(&self) -> VaultResult<()> {
        self.save_to(&self.dir)
    }

    /// Persist every entry to `<dir>/<uuid>.json`, removing an entry's
    /// previous backing file when it differs from the new path. Entries
    /// already written are not rolled back if a later write fails.
    pub fn save_to(&self, dir: &Path) -> VaultResult<()> {
        ensure_dir(dir)?;
        let mut inner = self.inner.lock();
        for (id, entry) in inner.keys.iter_mut() {
            let filename = dir.join(format!("{id}.json"));
            entry.document.save(&filename)?;
            if let Some(previous) = &entry.path {
                if *previous != filename {
                    if let Err(err) = fs::remove_file(previous) {
                        warn!(path = %previous.display(), %err, "could not remove old keystore file");
                    }
                }
            }
            entry.path = Some(filename);
        }
        Ok(())
    }

    /// Scan a directory and admit every readable version-2 document into the
    /// index. Unreadable files and other versions are skipped with a warning;
    /// an empty directory is a valid, empty vault.
    pub fn load_from(&self, dir: &Path) -> VaultResult<()> {
        ensure_dir(dir)?;
        let mut inner = self.inner.lock();
        for dir_entry in fs::read_dir(dir)? {
            let path = dir_entry?.path();
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), "reading keystore file");
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable key file");
                    continue;
                }
            };
            let document: KeyFile = match serde_json::from_str(&contents) {
                Ok(document) => document,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping invalid key file");
                    continue;
                }
            };
            let version = document.format_version();
            if version != KEYSTORE_VERSION {
                warn!(version, path = %path.display(), "cannot read key version");
                continue;
            }
            let id = match document.uuid() {
                Ok(id) => id,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping key file with malformed id");
                    continue;
                }
            };
            inner.keys.insert(
                id,
                Entry {
                    document,
                    path: Some(path),
                },
            );
        }
        Ok(())
    }

    /// Identifiers of all indexed entries, sorted.
    pub fn ids(&self) -> Vec<Uuid> {
        let inner = self.inner.lock();
        let mut ids: Vec<Uuid> = inner.keys.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Whether an entry with this identifier is indexed.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.inner.lock().keys.contains_key(id)
    }
}

/// Create the directory if missing, locking it down to the owner on Unix.
fn ensure_dir(dir: &Path) -> VaultResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::KdfParams;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    /// Build a vault entry directly with a low iteration count; decryption
    /// honors recorded parameters, so vault behavior is identical.
    fn quick_import(vault: &SecretVault, secret: &[u8], password: &str) -> Uuid {
        let kdfparams = KdfParams {
            c: 64,
            ..KdfParams::new(&[0x5A; 32])
        };
        let document = KeyFile::encrypt_with_kdf(secret, password, kdfparams).unwrap();
        let id = document.uuid().unwrap();
        {
            let mut inner = vault.inner.lock();
            inner.keys.insert(
                id,
                Entry {
                    document,
                    path: None,
                },
            );
        }
        vault.save().unwrap();
        id
    }

    #[test]
    fn secret_decrypts_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(dir.path()).unwrap();
        let id = quick_import(&vault, &[0xAB; 32], "pass");

        let prompts = AtomicUsize::new(0);
        let fetch = |expected: &str| {
            vault.secret(&id, || {
                prompts.fetch_add(1, Ordering::SeqCst);
                pw(expected)
            })
        };

        assert_eq!(fetch("pass").unwrap().expose_secret(), &vec![0xAB; 32]);
        assert_eq!(prompts.load(Ordering::SeqCst), 1);

        // Cache hit: no prompt, wrong password irrelevant.
        assert_eq!(fetch("anything").unwrap().expose_secret(), &vec![0xAB; 32]);
        assert_eq!(prompts.load(Ordering::SeqCst), 1);

        vault.clear_cache();
        assert!(fetch("wrong").is_none());
        assert_eq!(prompts.load(Ordering::SeqCst), 2);
        assert_eq!(fetch("pass").unwrap().expose_secret(), &vec![0xAB; 32]);
    }

    #[test]
    fn unknown_id_never_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(dir.path()).unwrap();
        let missing = Uuid::new_v4();
        assert!(vault
            .secret(&missing, || panic!("prompted for unknown id"))
            .is_none());
    }

    #[test]
    fn kill_removes_entry_cache_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(dir.path()).unwrap();
        let id = quick_import(&vault, &[0x01; 32], "pass");
        let keep = quick_import(&vault, &[0x02; 32], "pass");

        let file = dir.path().join(format!("{id}.json"));
        assert!(file.exists());
        assert!(vault.secret(&id, || pw("pass")).is_some());
        assert!(vault.secret(&keep, || pw("pass")).is_some());

        vault.kill(&id);
        assert!(!file.exists());
        assert!(!vault.contains(&id));
        assert!(vault.secret(&id, || panic!("prompted for killed id")).is_none());

        // The unrelated entry stays cached: no re-prompt.
        assert!(vault
            .secret(&keep, || panic!("unrelated cache entry was dropped"))
            .is_some());

        // Idempotent.
        vault.kill(&id);
        vault.kill(&Uuid::new_v4());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ids = {
            let vault = SecretVault::open(dir.path()).unwrap();
            let a = quick_import(&vault, &[0x0A; 32], "pass-a");
            let b = quick_import(&vault, &[0x0B; 32], "pass-a");
            (a, b)
        };

        let reloaded = SecretVault::open(dir.path()).unwrap();
        assert_eq!(reloaded.ids().len(), 2);
        assert_eq!(
            reloaded
                .secret(&ids.0, || pw("pass-a"))
                .unwrap()
                .expose_secret(),
            &vec![0x0A; 32]
        );
        assert_eq!(
            reloaded
                .secret(&ids.1, || pw("pass-a"))
                .unwrap()
                .expose_secret(),
            &vec![0x0B; 32]
        );
    }

    #[test]
    fn save_to_migrates_backing_files() {
        let old_dir = tempfile::tempdir().unwrap();
        let new_dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(old_dir.path()).unwrap();
        let id = quick_import(&vault, &[0x33; 32], "pass");

        let old_file = old_dir.path().join(format!("{id}.json"));
        let new_file = new_dir.path().join(format!("{id}.json"));
        assert!(old_file.exists());

        vault.save_to(new_dir.path()).unwrap();
        assert!(new_file.exists());
        assert!(!old_file.exists());

        // Saving again to the same place is idempotent.
        vault.save_to(new_dir.path()).unwrap();
        assert!(new_file.exists());
    }

    #[test]
    fn load_skips_other_versions() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(dir.path()).unwrap();
        let id = quick_import(&vault, &[0x44; 32], "pass");

        // A version-1 document alongside the valid one.
        let v1 = serde_json::json!({
            "crypto": {
                "kdf": "pbkdf2",
                "kdfparams": {"prf": "hmac-sha256", "c": 64, "salt": "00", "dklen": 16},
                "cipher": "aes-128-cbc",
                "cipherparams": {"iv": "00000000000000000000000000000000"},
                "ciphertext": "00",
                "mac": "00"
            },
            "id": Uuid::new_v4().to_string(),
            "version": 1
        });
        fs::write(dir.path().join("old.json"), v1.to_string()).unwrap();
        fs::write(dir.path().join("junk.json"), "not json").unwrap();

        let reloaded = SecretVault::open(dir.path()).unwrap();
        assert_eq!(reloaded.ids(), vec![id]);
    }

    #[test]
    fn load_accepts_legacy_version_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(dir.path()).unwrap();
        let id = quick_import(&vault, &[0x55; 32], "pass");

        // Rewrite the document with the capitalized string-typed field.
        let file = dir.path().join(format!("{id}.json"));
        let mut json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        let object = json.as_object_mut().unwrap();
        object.remove("version");
        object.insert("Version".to_string(), serde_json::json!("2"));
        fs::write(&file, json.to_string()).unwrap();

        let reloaded = SecretVault::open(dir.path()).unwrap();
        assert!(reloaded.contains(&id));
        assert_eq!(
            reloaded
                .secret(&id, || pw("pass"))
                .unwrap()
                .expose_secret(),
            &vec![0x55; 32]
        );
    }

    #[test]
    fn empty_directory_is_a_valid_vault() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SecretVault::open(dir.path().join("fresh")).unwrap();
        assert!(vault.ids().is_empty());
    }
}
