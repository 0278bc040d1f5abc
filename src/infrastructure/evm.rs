//! EVM 基础工具
//!
//! keccak 哈希、十六进制编解码、地址解析、路由合约 calldata 编码和签名

use k256::ecdsa::SigningKey;
use tiny_keccak::{Hasher, Keccak};

use crate::errors::{PluginError, Result};

/// Keccak-256
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// 带 0x 前缀的十六进制编码
pub fn hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(2 + data.len() * 2);
    out.push_str("0x");
    for b in data {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// 解码十六进制串，允许省略 0x 前缀，奇数长度左侧补零
pub fn hex_decode(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if s.is_empty() {
        return Ok(Vec::new());
    }
    if !s.is_ascii() {
        return Err(PluginError::Validation(format!("invalid hex '{}'", s)));
    }
    let padded;
    let hex = if s.len() % 2 != 0 {
        padded = format!("0{}", s);
        padded.as_str()
    } else {
        s
    };
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| PluginError::Validation(format!("invalid hex '{}': {}", s, e)))
        })
        .collect()
}

/// 解析 20 字节地址
pub fn parse_address(addr: &str) -> Result<[u8; 20]> {
    let bytes = hex_decode(addr)?;
    bytes.as_slice().try_into().map_err(|_| {
        PluginError::Validation(format!(
            "invalid address '{}': expected 20 bytes, got {}",
            addr.trim(),
            bytes.len()
        ))
    })
}

/// 4 字节函数选择器
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn word_u128(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_address(addr: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr);
    word
}

fn push_address_array(data: &mut Vec<u8>, path: &[[u8; 20]]) {
    data.extend_from_slice(&word_u128(path.len() as u128));
    for addr in path {
        data.extend_from_slice(&word_address(addr));
    }
}

/// `swapExactTokensForTokens(uint256,uint256,address[],address,uint256)`
pub fn encode_swap_exact_tokens_for_tokens(
    amount_in: u128,
    amount_out_min: u128,
    path: &[[u8; 20]],
    to: &[u8; 20],
    deadline: u64,
) -> Vec<u8> {
    let mut data =
        function_selector("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)").to_vec();
    data.extend_from_slice(&word_u128(amount_in));
    data.extend_from_slice(&word_u128(amount_out_min));
    // 五个头部字之后是 path
    data.extend_from_slice(&word_u128(5 * 32));
    data.extend_from_slice(&word_address(to));
    data.extend_from_slice(&word_u128(deadline as u128));
    push_address_array(&mut data, path);
    data
}

/// `swapExactETHForTokens(uint256,address[],address,uint256)`
pub fn encode_swap_exact_eth_for_tokens(
    amount_out_min: u128,
    path: &[[u8; 20]],
    to: &[u8; 20],
    deadline: u64,
) -> Vec<u8> {
    let mut data = function_selector("swapExactETHForTokens(uint256,address[],address,uint256)").to_vec();
    data.extend_from_slice(&word_u128(amount_out_min));
    data.extend_from_slice(&word_u128(4 * 32));
    data.extend_from_slice(&word_address(to));
    data.extend_from_slice(&word_u128(deadline as u128));
    push_address_array(&mut data, path);
    data
}

/// EIP-191 个人消息摘要
pub fn eip191_digest(message: &[u8]) -> [u8; 32] {
    let mut buf = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    buf.extend_from_slice(message);
    keccak256(&buf)
}

/// 从十六进制私钥创建签名密钥
pub fn signing_key_from_hex(private_key: &str) -> Result<SigningKey> {
    let bytes = hex_decode(private_key)
        .map_err(|_| PluginError::Signing("client private key is not valid hex".to_string()))?;
    SigningKey::from_slice(&bytes).map_err(|e| PluginError::Signing(e.to_string()))
}

/// 对 32 字节摘要签名，返回 `r || s || v`，v 为 27 或 28
pub fn sign_digest(key: &SigningKey, digest: &[u8; 32]) -> Result<[u8; 65]> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| PluginError::Signing(e.to_string()))?;
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}
