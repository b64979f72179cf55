//! In-memory server and local filesystem for tests.

use std::{
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{
    fs::{LocalEntry, LocalFs},
    ConnectOptions, Connection, Credentials, FtpSession, TransferMode,
};
use crate::{error::Error, utils};

/// Host the memory server refuses to connect to.
pub(crate) const UNREACHABLE: &str = "unreachable.invalid";
/// Modification time reported for every file.
pub(crate) const MODIFIED: i64 = 1_700_000_000;

const USERNAME: &str = "user";
const SECRET: &str = "secret";
const MAX_HOPS: usize = 8;

pub(crate) type Journal = Arc<Mutex<Vec<Call>>>;

/// A command as the session issued it, arguments untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Connect(String),
    Authenticate(String),
    Close,
    ChangeDirectory(String),
    CurrentDirectory,
    DeleteFile(String),
    CreateDirectory(String),
    DeleteDirectory(String),
    Rename(String, String),
    ListNames(String),
    ListDetailed(String),
    Upload(String),
    LastModified(String),
    Help,
}

pub(crate) fn calls(journal: &Journal) -> Vec<Call> {
    journal.lock().unwrap().clone()
}

pub(crate) fn changed_directory(journal: &Journal) -> bool {
    calls(journal)
        .iter()
        .any(|c| matches!(c, Call::ChangeDirectory(_)))
}

pub(crate) fn credentials() -> Credentials {
    Credentials::new(USERNAME, SECRET)
}

pub(crate) async fn authenticated(server: MemoryServer) -> FtpSession<MemoryServer> {
    let _ = env_logger::builder().is_test(true).try_init();
    FtpSession::open(server, &ConnectOptions::new("localhost"), &credentials())
        .await
        .unwrap()
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => ".",
    }
}

fn segments(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}

fn not_found(path: &str) -> Error {
    Error::reply(550, format!("{path}: No such file or directory"))
}

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
    Link(String),
}

#[derive(Debug)]
struct State {
    nodes: BTreeMap<String, Node>,
    cwd: String,
    raw_listings: HashMap<String, Vec<String>>,
    unreadable: HashSet<String>,
    fail_current_directory: bool,
    pwd_failures: HashSet<String>,
}

impl State {
    fn resolve(&self, path: &str) -> String {
        utils::join(&self.cwd, path)
    }

    /// Resolves `path` following links in every segment, like a server
    /// walking its real filesystem.
    fn follow(&self, path: &str) -> Option<(String, &Node)> {
        let mut pending: VecDeque<String> = segments(&self.resolve(path)).collect();
        let mut current = "/".to_owned();
        let mut hops = 0;

        while let Some(segment) = pending.pop_front() {
            let next = utils::join(&current, &segment);
            match self.nodes.get(&next)? {
                Node::Link(target) => {
                    hops += 1;
                    if hops > MAX_HOPS {
                        return None;
                    }
                    let target = utils::join(&current, target);
                    for segment in segments(&target).collect::<Vec<_>>().into_iter().rev() {
                        pending.push_front(segment);
                    }
                    current = "/".to_owned();
                }
                Node::File(_) if !pending.is_empty() => return None,
                _ => current = next,
            }
        }

        let node = self.nodes.get(&current)?;
        Some((current, node))
    }

    fn directory(&self, path: &str) -> Result<String, Error> {
        match self.follow(path) {
            Some((resolved, Node::Dir)) => Ok(resolved),
            _ => Err(not_found(path)),
        }
    }

    fn readable_directory(&self, path: &str) -> Result<String, Error> {
        let dir = self.directory(path)?;
        if self.unreadable.contains(&dir) {
            return Err(Error::reply(450, format!("{path}: Permission denied")));
        }
        Ok(dir)
    }

    fn children<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = (&'a str, &'a Node)> + 'a {
        self.nodes
            .iter()
            .filter(move |(path, _)| path.as_str() != dir && parent(path) == dir)
            .map(|(path, node)| (utils::basename(path), node))
    }

    fn is_directory(&self, path: &str) -> bool {
        matches!(self.nodes.get(path), Some(Node::Dir))
    }

    fn add(&mut self, path: &str, node: Node) {
        let path = utils::normalize(path);
        let mut ancestor = parent(&path).to_owned();
        loop {
            let _ = self.nodes.entry(ancestor.clone()).or_insert(Node::Dir);
            if ancestor == "/" {
                break;
            }
            ancestor = parent(&ancestor).to_owned();
        }
        let _ = self.nodes.insert(path, node);
    }

    fn change_directory(&mut self, path: &str) -> Result<(), Error> {
        self.cwd = self.directory(path)?;
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<(), Error> {
        let path = self.resolve(path);
        match self.nodes.get(&path) {
            Some(Node::File(_) | Node::Link(_)) => {
                let _ = self.nodes.remove(&path);
                Ok(())
            }
            _ => Err(not_found(&path)),
        }
    }

    fn create_directory(&mut self, path: &str) -> Result<(), Error> {
        let path = self.resolve(path);
        if self.nodes.contains_key(&path) {
            return Err(Error::reply(550, format!("{path}: File exists")));
        }
        if !self.is_directory(parent(&path)) {
            return Err(not_found(parent(&path)));
        }
        let _ = self.nodes.insert(path, Node::Dir);
        Ok(())
    }

    fn delete_directory(&mut self, path: &str) -> Result<(), Error> {
        let path = self.resolve(path);
        if path == "/" || !self.is_directory(&path) {
            return Err(not_found(&path));
        }
        if self.children(&path).next().is_some() {
            return Err(Error::reply(550, format!("{path}: Directory not empty")));
        }
        let _ = self.nodes.remove(&path);
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), Error> {
        let from = self.resolve(from);
        let to = self.resolve(to);
        if from == "/" || !self.nodes.contains_key(&from) {
            return Err(not_found(&from));
        }
        if self.nodes.contains_key(&to) || !self.is_directory(parent(&to)) {
            return Err(Error::reply(553, format!("{to}: Not allowed")));
        }

        let prefix = format!("{from}/");
        let moved: Vec<String> = self
            .nodes
            .keys()
            .filter(|path| **path == from || path.starts_with(&prefix))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = self.nodes.remove(&old) {
                let _ = self.nodes.insert(format!("{to}{}", &old[from.len()..]), node);
            }
        }
        Ok(())
    }

    fn list_names(&self, path: &str) -> Result<Vec<String>, Error> {
        let dir = self.readable_directory(path)?;
        let mut names = vec![".".to_owned(), "..".to_owned()];
        names.extend(self.children(&dir).map(|(name, _)| name.to_owned()));
        Ok(names)
    }

    fn list_detailed(&self, path: &str) -> Result<Vec<String>, Error> {
        if let Some(lines) = self.raw_listings.get(&self.resolve(path)) {
            return Ok(lines.clone());
        }

        let dir = self.readable_directory(path)?;
        let mut lines = vec![
            "drwxr-xr-x   2 user group  4096 Nov 14 22:13 .".to_owned(),
            "drwxr-xr-x   5 user group  4096 Nov 14 22:13 ..".to_owned(),
        ];
        lines.extend(self.children(&dir).map(|(name, node)| match node {
            Node::Dir => format!("drwxr-xr-x   2 user group  4096 Nov 14 22:13 {name}"),
            Node::File(data) => {
                format!("-rw-r--r--   1 user group {:>5} Nov 14 22:13 {name}", data.len())
            }
            Node::Link(target) => format!(
                "lrwxrwxrwx   1 user group {:>5} Nov 14 22:13 {name} -> {target}",
                target.len()
            ),
        }));
        Ok(lines)
    }

    fn store(&mut self, path: &str, data: Vec<u8>) -> Result<(), Error> {
        let path = self.resolve(path);
        if !self.is_directory(parent(&path)) || self.is_directory(&path) {
            return Err(Error::reply(553, format!("{path}: Could not create file")));
        }
        let _ = self.nodes.insert(path, Node::File(data));
        Ok(())
    }

    fn last_modified(&self, path: &str) -> i64 {
        match self.follow(path) {
            Some((_, Node::File(_))) => MODIFIED,
            _ => -1,
        }
    }
}

/// A [`Connection`] to a server that keeps its tree in memory.
///
/// Clones share the tree and the journal.
#[derive(Debug, Clone)]
pub(crate) struct MemoryServer {
    state: Arc<Mutex<State>>,
    journal: Journal,
}

impl MemoryServer {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                nodes: BTreeMap::from([("/".to_owned(), Node::Dir)]),
                cwd: "/".to_owned(),
                raw_listings: HashMap::new(),
                unreadable: HashSet::new(),
                fail_current_directory: false,
                pwd_failures: HashSet::new(),
            })),
            journal: Journal::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn with<F: FnOnce(&mut State)>(self, f: F) -> Self {
        f(&mut self.state());
        self
    }

    fn record(&self, call: Call) {
        self.journal.lock().unwrap().push(call);
    }

    /// Adds a directory and its missing parents.
    pub(crate) fn dir(self, path: &str) -> Self {
        self.with(|state| state.add(path, Node::Dir))
    }

    pub(crate) fn file<D: AsRef<[u8]>>(self, path: &str, content: D) -> Self {
        self.with(|state| state.add(path, Node::File(content.as_ref().to_vec())))
    }

    pub(crate) fn link(self, path: &str, target: &str) -> Self {
        self.with(|state| state.add(path, Node::Link(target.to_owned())))
    }

    /// Serves `lines` verbatim as the detailed listing of `path`.
    pub(crate) fn raw_listing(self, path: &str, lines: &[&str]) -> Self {
        let lines: Vec<String> = lines.iter().map(|&line| line.to_owned()).collect();
        self.with(|state| {
            let _ = state.raw_listings.insert(utils::normalize(path), lines);
        })
    }

    /// `path` can be entered but not listed.
    pub(crate) fn unreadable(self, path: &str) -> Self {
        self.with(|state| {
            let _ = state.unreadable.insert(utils::normalize(path));
        })
    }

    pub(crate) fn cwd(self, path: &str) -> Self {
        self.with(|state| {
            state.add(path, Node::Dir);
            state.cwd = utils::normalize(path);
        })
    }

    /// Every `PWD` fails.
    pub(crate) fn fail_current_directory(self) -> Self {
        self.with(|state| state.fail_current_directory = true)
    }

    /// `PWD` fails while the working directory is `path`.
    pub(crate) fn fail_current_directory_in(self, path: &str) -> Self {
        self.with(|state| {
            let _ = state.pwd_failures.insert(utils::normalize(path));
        })
    }

    pub(crate) fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    pub(crate) fn content(&self, path: &str) -> Option<Vec<u8>> {
        match self.state().nodes.get(path) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl Connection for MemoryServer {
    async fn connect(&mut self, options: &ConnectOptions) -> Result<(), Error> {
        self.record(Call::Connect(options.host.clone()));
        if options.host == UNREACHABLE {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused").into());
        }
        Ok(())
    }

    async fn authenticate(&mut self, username: &str, secret: &str) -> Result<(), Error> {
        self.record(Call::Authenticate(username.to_owned()));
        if username == USERNAME && secret == SECRET {
            Ok(())
        } else {
            Err(Error::reply(530, "Login incorrect."))
        }
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.record(Call::Close);
        Ok(())
    }

    async fn change_directory(&mut self, path: &str) -> Result<(), Error> {
        self.record(Call::ChangeDirectory(path.to_owned()));
        self.state().change_directory(path)
    }

    async fn current_directory(&mut self) -> Result<String, Error> {
        self.record(Call::CurrentDirectory);
        let state = self.state();
        if state.fail_current_directory || state.pwd_failures.contains(&state.cwd) {
            return Err(Error::reply(550, "PWD not permitted"));
        }
        Ok(state.cwd.clone())
    }

    async fn delete_file(&mut self, path: &str) -> Result<(), Error> {
        self.record(Call::DeleteFile(path.to_owned()));
        self.state().delete_file(path)
    }

    async fn create_directory(&mut self, path: &str) -> Result<(), Error> {
        self.record(Call::CreateDirectory(path.to_owned()));
        self.state().create_directory(path)
    }

    async fn delete_directory(&mut self, path: &str) -> Result<(), Error> {
        self.record(Call::DeleteDirectory(path.to_owned()));
        self.state().delete_directory(path)
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), Error> {
        self.record(Call::Rename(from.to_owned(), to.to_owned()));
        self.state().rename(from, to)
    }

    async fn list_names(&mut self, path: &str) -> Result<Vec<String>, Error> {
        self.record(Call::ListNames(path.to_owned()));
        self.state().list_names(path)
    }

    async fn list_detailed(&mut self, path: &str) -> Result<Vec<String>, Error> {
        self.record(Call::ListDetailed(path.to_owned()));
        self.state().list_detailed(path)
    }

    async fn upload(
        &mut self,
        remote_path: &str,
        source: &mut (dyn AsyncRead + Unpin + Send),
        _mode: TransferMode,
    ) -> Result<(), Error> {
        self.record(Call::Upload(remote_path.to_owned()));
        let mut data = Vec::new();
        let _ = source.read_to_end(&mut data).await?;
        self.state().store(remote_path, data)
    }

    async fn last_modified(&mut self, path: &str) -> Result<i64, Error> {
        self.record(Call::LastModified(path.to_owned()));
        Ok(self.state().last_modified(path))
    }

    async fn help(&mut self) -> Result<Vec<String>, Error> {
        self.record(Call::Help);
        Ok(vec![
            "214-The following commands are recognized.".to_owned(),
            " CWD PWD CDUP NLST LIST MKD RMD DELE RNFR RNTO STOR MDTM".to_owned(),
            "214 Help OK.".to_owned(),
        ])
    }
}

/// In-memory [`LocalFs`]. Directories map to `None`.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryFs {
    nodes: BTreeMap<PathBuf, Option<Vec<u8>>>,
    unreadable: HashSet<PathBuf>,
}

impl MemoryFs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn add(mut self, path: &Path, node: Option<Vec<u8>>) -> Self {
        for ancestor in path.ancestors().skip(1) {
            let _ = self.nodes.entry(ancestor.to_owned()).or_insert(None);
        }
        let _ = self.nodes.insert(path.to_owned(), node);
        self
    }

    pub(crate) fn dir<P: AsRef<Path>>(self, path: P) -> Self {
        self.add(path.as_ref(), None)
    }

    pub(crate) fn file<P: AsRef<Path>, D: AsRef<[u8]>>(self, path: P, content: D) -> Self {
        self.add(path.as_ref(), Some(content.as_ref().to_vec()))
    }

    pub(crate) fn unreadable<P: AsRef<Path>>(mut self, path: P) -> Self {
        let _ = self.unreadable.insert(path.as_ref().to_owned());
        self
    }
}

#[async_trait]
impl LocalFs for MemoryFs {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<LocalEntry>> {
        if !matches!(self.nodes.get(path), Some(None)) {
            return Err(io::ErrorKind::NotFound.into());
        }
        Ok(self
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .filter_map(|(child, node)| {
                Some(LocalEntry {
                    name: child.file_name()?.to_string_lossy().into_owned(),
                    is_dir: node.is_none(),
                })
            })
            .collect())
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Unpin + Send>> {
        if self.unreadable.contains(path) {
            return Err(io::ErrorKind::PermissionDenied.into());
        }
        match self.nodes.get(path) {
            Some(Some(data)) => Ok(Box::new(io::Cursor::new(data.clone()))),
            _ => Err(io::ErrorKind::NotFound.into()),
        }
    }
}
